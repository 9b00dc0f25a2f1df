//! Interactive menu over a `Ledger`.
//!
//! Generic over the input and output streams so sessions can be scripted in
//! tests. Each action reads its own prompts; a failed action prints the error
//! and returns to the menu.

use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use std::io::{BufRead, Write};
use std::str::FromStr;

use gridledger_common::{BuyerId, SellerId, TransactionId};
use gridledger_ledger::dates::{date_range, format_timestamp};
use gridledger_ledger::views::{self, RangeSummary};
use gridledger_ledger::{Buyer, Ledger, Seller, Transaction};

const RULE: &str =
    "--------------------------------------------------------------------------------------";
const SHORT_RULE: &str = "------------------------------------------";

/// A menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Exit,
    AddTransaction,
    ListTransactions,
    ListSellers,
    ListBuyers,
    TimeRange,
    SellerRevenue,
    EnergyRange,
    BuyersByEnergy,
    PairsByCount,
}

impl Action {
    fn from_choice(choice: u32) -> Option<Self> {
        Some(match choice {
            0 => Self::Exit,
            1 => Self::AddTransaction,
            2 => Self::ListTransactions,
            3 => Self::ListSellers,
            4 => Self::ListBuyers,
            5 => Self::TimeRange,
            6 => Self::SellerRevenue,
            7 => Self::EnergyRange,
            8 => Self::BuyersByEnergy,
            9 => Self::PairsByCount,
            _ => return None,
        })
    }
}

pub struct Menu<R, W> {
    input: R,
    out: W,
    ledger: Ledger,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, out: W, ledger: Ledger) -> Self {
        Self { input, out, ledger }
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Runs until the user picks exit or input ends.
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.print_menu()?;
            let Some(line) = self.read_line()? else {
                writeln!(self.out)?;
                return Ok(());
            };

            let action = match line.trim().parse::<u32>() {
                Ok(choice) => Action::from_choice(choice),
                Err(_) => {
                    writeln!(self.out, "Invalid input. Please enter a number.")?;
                    continue;
                }
            };
            let Some(action) = action else {
                writeln!(self.out, "Invalid choice. Please try again.")?;
                continue;
            };
            if action == Action::Exit {
                writeln!(self.out, "Exiting. Goodbye!")?;
                return Ok(());
            }

            if let Err(e) = self.dispatch(action) {
                writeln!(self.out, "Error: {:#}", e)?;
            }
        }
    }

    fn print_menu(&mut self) -> anyhow::Result<()> {
        write!(
            self.out,
            "\n===== GRIDLEDGER ENERGY TRADING =====\n\
             1. Add new transaction\n\
             2. Display all transactions\n\
             3. Transactions per seller\n\
             4. Transactions per buyer\n\
             5. Transactions in a time period\n\
             6. Total revenue by seller\n\
             7. Transactions in an energy range\n\
             8. Buyers sorted by energy bought\n\
             9. Seller/buyer pairs sorted by transaction count\n\
             0. Exit\n\
             Enter your choice: "
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn dispatch(&mut self, action: Action) -> anyhow::Result<()> {
        match action {
            Action::Exit => Ok(()),
            Action::AddTransaction => self.add_transaction(),
            Action::ListTransactions => self.list_transactions(),
            Action::ListSellers => self.list_sellers(),
            Action::ListBuyers => self.list_buyers(),
            Action::TimeRange => self.time_range(),
            Action::SellerRevenue => self.seller_revenue(),
            Action::EnergyRange => self.energy_range(),
            Action::BuyersByEnergy => self.buyers_by_energy(),
            Action::PairsByCount => self.pairs_by_count(),
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn prompt<T>(&mut self, label: &str) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        write!(self.out, "{}: ", label)?;
        self.out.flush()?;
        let line = self
            .read_line()?
            .ok_or_else(|| anyhow!("input ended"))?;
        let value = line.trim();
        value
            .parse()
            .with_context(|| format!("invalid value {:?} for {}", value, label))
    }

    // =========================================================================
    // Actions
    // =========================================================================

    fn add_transaction(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "\n----- Add New Transaction -----")?;
        let id: u32 = self.prompt("Transaction ID")?;
        let buyer: u32 = self.prompt("Buyer ID")?;
        let seller: u32 = self.prompt("Seller ID")?;
        let energy: f64 = self.prompt("Energy (kWh)")?;
        if !energy.is_finite() || energy < 0.0 {
            bail!("energy must be a non-negative number");
        }

        let seller_id = SellerId::new(seller);
        let price = match self.ledger.quote_price(seller_id, energy) {
            Some(rate) => {
                writeln!(self.out, "Using seller's fixed rate: {:.4} per kWh", rate)?;
                rate
            }
            None => {
                let price: f64 = self.prompt("Price per kWh")?;
                if !price.is_finite() || price < 0.0 {
                    bail!("price must be a non-negative number");
                }
                price
            }
        };

        let tx = self.ledger.record(Transaction::new(
            TransactionId::new(id),
            BuyerId::new(buyer),
            seller_id,
            energy,
            price,
            Utc::now().timestamp(),
        ))?;
        writeln!(self.out, "Transaction {} added.", tx.id())?;
        Ok(())
    }

    fn list_transactions(&mut self) -> anyhow::Result<()> {
        let registry = self.ledger.registry();
        if registry.transactions().is_empty() {
            writeln!(self.out, "No transactions recorded.")?;
            return Ok(());
        }

        writeln!(self.out, "\n===== TRANSACTION LIST =====")?;
        let count = write_transaction_table(&mut self.out, views::all_transactions(registry))?;
        writeln!(self.out, "Total transactions: {}\n", count)?;
        Ok(())
    }

    fn list_sellers(&mut self) -> anyhow::Result<()> {
        let registry = self.ledger.registry();
        if registry.sellers().is_empty() {
            writeln!(self.out, "No sellers recorded.")?;
            return Ok(());
        }

        writeln!(self.out, "\n===== SELLER LIST =====")?;
        for (_, seller) in registry.sellers() {
            write_seller_header(&mut self.out, seller)?;
            write_transaction_table(&mut self.out, seller.transactions())?;
        }
        writeln!(self.out, "Total sellers: {}\n", registry.sellers().len())?;
        Ok(())
    }

    fn list_buyers(&mut self) -> anyhow::Result<()> {
        let registry = self.ledger.registry();
        if registry.buyers().is_empty() {
            writeln!(self.out, "No buyers recorded.")?;
            return Ok(());
        }

        writeln!(self.out, "\n===== BUYER LIST =====")?;
        for (_, buyer) in registry.buyers() {
            write_buyer_header(&mut self.out, buyer)?;
            write_transaction_table(&mut self.out, buyer.transactions())?;
        }
        writeln!(self.out, "Total buyers: {}\n", registry.buyers().len())?;
        Ok(())
    }

    fn time_range(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "\n----- Transactions in Time Period -----")?;
        let start: String = self.prompt("Start date (YYYY-MM-DD)")?;
        let end: String = self.prompt("End date (YYYY-MM-DD)")?;
        let (from, to) = date_range(&start, &end)?;

        let RangeSummary {
            transactions,
            total_energy_kwh,
            total_revenue,
        } = views::transactions_in_time_range(self.ledger.registry(), from, to);

        writeln!(self.out, "\n===== TRANSACTIONS FROM {} TO {} =====", start, end)?;
        let count = write_transaction_table(&mut self.out, transactions.into_iter())?;
        writeln!(
            self.out,
            "Total transactions: {} | Total energy: {:.2} kWh | Total revenue: ${:.2}\n",
            count, total_energy_kwh, total_revenue
        )?;
        Ok(())
    }

    fn seller_revenue(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "\n----- Revenue by Seller -----")?;
        let mut seller: u32 = self.prompt("Seller ID (0 to list sellers first)")?;
        if seller == 0 {
            self.list_sellers()?;
            seller = self.prompt("Seller ID")?;
        }

        let summary = views::seller_revenue(self.ledger.registry(), SellerId::new(seller));
        writeln!(
            self.out,
            "\n===== REVENUE SUMMARY FOR SELLER {} =====\n\
             Total transactions: {}\n\
             Total energy sold: {:.2} kWh\n\
             Total revenue: ${:.2}\n",
            summary.seller_id,
            summary.transaction_count,
            summary.total_energy_kwh,
            summary.total_revenue
        )?;
        Ok(())
    }

    fn energy_range(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "\n----- Transactions by Energy Range -----")?;
        let min: f64 = self.prompt("Minimum energy (kWh)")?;
        let max: f64 = self.prompt("Maximum energy (kWh)")?;
        if min > max {
            bail!("minimum {:.2} is above maximum {:.2}", min, max);
        }

        let view = views::transactions_by_energy(self.ledger.registry(), min, max);
        writeln!(
            self.out,
            "\n===== TRANSACTIONS BY ENERGY ({:.2} - {:.2} kWh) =====",
            min, max
        )?;
        let count = write_transaction_table(&mut self.out, view.into_iter())?;
        writeln!(self.out, "Total transactions in range: {}\n", count)?;
        Ok(())
    }

    fn buyers_by_energy(&mut self) -> anyhow::Result<()> {
        let view = views::buyers_by_energy(self.ledger.registry());
        if view.is_empty() {
            writeln!(self.out, "No buyers recorded.")?;
            return Ok(());
        }

        writeln!(self.out, "\n===== BUYERS BY ENERGY PURCHASED (ASCENDING) =====")?;
        writeln!(self.out, "{:<8} | {:<20}", "BUYER", "TOTAL ENERGY (kWh)")?;
        writeln!(self.out, "{}", SHORT_RULE)?;
        for buyer in &view {
            writeln!(
                self.out,
                "{:<8} | {:<20.2}",
                buyer.id(),
                buyer.total_energy_purchased()
            )?;
        }
        writeln!(self.out, "{}", SHORT_RULE)?;
        writeln!(self.out, "Total buyers: {}\n", view.len())?;
        Ok(())
    }

    fn pairs_by_count(&mut self) -> anyhow::Result<()> {
        let view = views::pairs_by_transaction_count(self.ledger.registry());
        if view.is_empty() {
            writeln!(self.out, "No seller/buyer pairs recorded.")?;
            return Ok(());
        }

        writeln!(
            self.out,
            "\n===== SELLER/BUYER PAIRS BY TRANSACTION COUNT (ASCENDING) ====="
        )?;
        writeln!(self.out, "{:<8} | {:<8} | {:<12}", "SELLER", "BUYER", "TRANSACTIONS")?;
        writeln!(self.out, "{}", SHORT_RULE)?;
        for pair in &view {
            writeln!(
                self.out,
                "{:<8} | {:<8} | {:<12}",
                pair.seller_id(),
                pair.buyer_id(),
                pair.transaction_count()
            )?;
        }
        writeln!(self.out, "{}", SHORT_RULE)?;
        writeln!(self.out, "Total pairs: {}\n", view.len())?;
        Ok(())
    }
}

// =============================================================================
// Tables
// =============================================================================

/// Writes a transaction table and returns the number of rows.
fn write_transaction_table<'a, W: Write>(
    out: &mut W,
    transactions: impl Iterator<Item = &'a Transaction>,
) -> anyhow::Result<usize> {
    writeln!(
        out,
        "{:<6} | {:<8} | {:<8} | {:<12} | {:<12} | {:<12} | {:<19}",
        "ID", "BUYER", "SELLER", "ENERGY (kWh)", "PRICE/kWh", "TOTAL", "TIMESTAMP"
    )?;
    writeln!(out, "{}", RULE)?;

    let mut count = 0;
    for tx in transactions {
        writeln!(
            out,
            "{:<6} | {:<8} | {:<8} | {:<12.2} | {:<12.2} | {:<12.2} | {:<19}",
            tx.id(),
            tx.buyer_id(),
            tx.seller_id(),
            tx.energy_kwh(),
            tx.price_per_kwh(),
            tx.total_price(),
            format_timestamp(tx.timestamp())
        )?;
        count += 1;
    }

    writeln!(out, "{}", RULE)?;
    Ok(count)
}

fn write_seller_header<W: Write>(out: &mut W, seller: &Seller) -> anyhow::Result<()> {
    let regulars = if seller.regular_buyers().is_empty() {
        "none".to_string()
    } else {
        seller
            .regular_buyers()
            .iter()
            .map(|entry| format!("{}({} tx)", entry.buyer_id, entry.transaction_count))
            .collect::<Vec<_>>()
            .join(", ")
    };

    writeln!(
        out,
        "\nSeller {} | rate <300: {:.4} | rate >=300: {:.4} | revenue: ${:.2} | regular buyers: {}",
        seller.id(),
        seller.rate_below_300(),
        seller.rate_above_300(),
        seller.total_revenue(),
        regulars
    )?;
    Ok(())
}

fn write_buyer_header<W: Write>(out: &mut W, buyer: &Buyer) -> anyhow::Result<()> {
    writeln!(
        out,
        "\nBuyer {} | total energy: {:.2} kWh",
        buyer.id(),
        buyer.total_energy_purchased()
    )?;
    Ok(())
}
