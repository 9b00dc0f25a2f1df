//! Identifier types for ledger entities.
//!
//! Every entity kind gets its own newtype so a buyer id can never be used to
//! look up a seller. All identifiers map onto the `u64` key space of the
//! ordered index through `as_key`.

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl $name {
            /// Creates a new identifier.
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Returns the raw identifier value.
            #[inline]
            pub const fn get(self) -> u32 {
                self.0
            }

            /// Returns the identifier as an index key.
            #[inline]
            pub const fn as_key(self) -> u64 {
                self.0 as u64
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

entity_id!(
    /// Caller-supplied unique transaction identifier.
    TransactionId
);

entity_id!(
    /// Seller identifier.
    SellerId
);

entity_id!(
    /// Buyer identifier.
    BuyerId
);

/// Composite key of a seller/buyer pair.
///
/// Packs the seller id into the high 32 bits and the buyer id into the low
/// 32 bits, so every `(SellerId, BuyerId)` combination maps to a distinct key
/// and pair keys sort by seller first, then buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey(u64);

impl PairKey {
    /// Creates the key for a seller/buyer pair.
    pub const fn new(seller_id: SellerId, buyer_id: BuyerId) -> Self {
        Self(((seller_id.0 as u64) << 32) | (buyer_id.0 as u64))
    }

    /// Returns the packed key value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Seller half of the key.
    pub const fn seller_id(self) -> SellerId {
        SellerId((self.0 >> 32) as u32)
    }

    /// Buyer half of the key.
    pub const fn buyer_id(self) -> BuyerId {
        BuyerId(self.0 as u32)
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.seller_id(), self.buyer_id())
    }
}
