use std::io::Write;

use rust_decimal::Decimal;

use crate::{error::AppResult, models::Transaction};

pub const CSV_HEADER: &str = "ID Transaksi,Tanggal,Waktu,Nama Produk,Jumlah,Harga Satuan,Subtotal";

/// Serialize transaction history to CSV: the fixed header, then one row per
/// line item, so a transaction with three lines yields three rows sharing
/// its id, date and time. Subtotals are recomputed from the line's own
/// price and quantity rather than read from the stored total.
pub fn export_csv<W: Write>(mut out: W, transactions: &[Transaction]) -> AppResult<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for transaction in transactions {
        let date = transaction.timestamp.format("%d-%m-%Y").to_string();
        let time = transaction.timestamp.format("%H:%M:%S").to_string();
        for item in &transaction.items {
            let subtotal = item.price * Decimal::from(item.quantity);
            writeln!(
                out,
                "{},{},{},{},{},{},{}",
                quoted(&transaction.id),
                quoted(&date),
                quoted(&time),
                quoted(&item.product_name),
                quoted(&item.quantity.to_string()),
                quoted(&item.price.to_string()),
                quoted(&subtotal.to_string()),
            )?;
        }
    }
    Ok(())
}

pub fn export_csv_string(transactions: &[Transaction]) -> AppResult<String> {
    let mut buf = Vec::new();
    export_csv(&mut buf, transactions)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// Every field is quoted; embedded quotes are doubled per RFC 4180.
fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
