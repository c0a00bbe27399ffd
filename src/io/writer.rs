use std::io::Write;

use crate::domain::{account::Credits, account_book::AccountBook};

#[derive(serde::Serialize)]
/// Internal CSV output row representation matching the report headers.
///
/// Headers written (in this order): `email,name,role,tier,credits`.
struct OutputRow<'a> {
    email: &'a str,
    name: &'a str,
    role: String,
    tier: String,
    credits: Credits,
}

/// Writes the account book to a CSV writer.
///
/// The output includes a header row: `email,name,role,tier,credits`.
/// Accounts are sorted by email so repeated runs produce identical reports.
///
/// # Errors
///
/// Returns a `csv::Error` if writing/serializing any row fails.
///
/// # Examples
///
/// ```
/// use imager_ledger::io::writer::write_accounts;
/// use imager_ledger::domain::{account::Account, account_book::AccountBook};
///
/// let mut book = AccountBook::new();
/// book.upsert(Account::standard("user_2".into(), "Bo".into(), "bo@x.com".into(), 40));
/// book.upsert(Account::standard("user_1".into(), "Ana".into(), "ana@x.com".into(), 12));
///
/// let mut out = Vec::new();
/// write_accounts(&mut out, &book).unwrap();
///
/// let s = String::from_utf8(out).unwrap();
/// assert!(s.starts_with("email,name,role,tier,credits\nana@x.com,"));
/// ```
pub fn write_accounts<W: Write>(writer: W, accounts: &AccountBook) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    let mut rows: Vec<_> = accounts.iter().collect();
    rows.sort_by(|a, b| a.email.cmp(&b.email));

    for acc in rows {
        wtr.serialize(OutputRow {
            email: &acc.email,
            name: &acc.name,
            role: acc.role.to_string(),
            tier: acc.tier.to_string(),
            credits: acc.credits,
        })?;
    }

    wtr.flush()?;
    Ok(())
}
