use crate::common::{event::LedgerEvent, money::Money};
use chrono::NaiveDate;
use std::io::Read;

#[derive(serde::Deserialize)]
/// Internal CSV row representation matching the command file headers. Only
/// `command` is always present; the rest depend on the command.
struct CsvRow {
    command: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    plan: Option<String>,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

/// Reads and validates ledger commands from a CSV reader.
///
/// Supported headers: `command,email,name,password,amount,plan,reference,date,note`.
/// The command name is case-insensitive. `amount` is a whole credit count for
/// `deduct`, `grant` and `set_credits`, and a decimal price for `submit`.
/// Errors carry the line number and command.
///
/// # Examples
///
/// ```
/// use imager_ledger::io::reader::read_commands;
/// use imager_ledger::common::event::LedgerEvent;
/// use csv::ReaderBuilder;
///
/// let data = "command,email,name,password,amount\n\
/// login,ana@x.com,,pw,\n\
/// deduct,,,,4\n";
/// let mut rdr = ReaderBuilder::new().flexible(true).from_reader(data.as_bytes());
/// let events: Vec<_> = read_commands(&mut rdr).collect();
///
/// assert!(matches!(events[0], Ok(LedgerEvent::Login { .. })));
/// assert!(matches!(events[1], Ok(LedgerEvent::Deduct { amount: 4 })));
/// ```
pub fn read_commands<R: Read>(
    rdr: &mut csv::Reader<R>,
) -> impl Iterator<Item = Result<LedgerEvent, String>> + '_ {
    rdr.deserialize::<CsvRow>().enumerate().map(|(idx, res)| {
        // header is line 1
        let line = idx + 2;
        let row = res.map_err(|e| e.to_string())?;
        parse_row(row).map_err(|e| format!("line {line}: {e}"))
    })
}

fn parse_row(row: CsvRow) -> Result<LedgerEvent, String> {
    let kind = row.command.trim().to_ascii_lowercase();
    let need = |field: Option<String>, name: &str| -> Result<String, String> {
        field
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| format!("{kind} missing {name}"))
    };

    match kind.as_str() {
        "login" => Ok(LedgerEvent::Login {
            email: need(row.email, "email")?,
            password: need(row.password, "password")?,
        }),
        "signup" => Ok(LedgerEvent::Signup {
            name: need(row.name, "name")?,
            email: need(row.email, "email")?,
            password: need(row.password, "password")?,
        }),
        "logout" => Ok(LedgerEvent::Logout),
        "deduct" => Ok(LedgerEvent::Deduct {
            amount: parse_credits(&need(row.amount, "amount")?)?,
        }),
        "grant" => Ok(LedgerEvent::Grant {
            amount: parse_credits(&need(row.amount, "amount")?)?,
        }),
        "submit" => {
            let amount = need(row.amount, "amount")?
                .parse::<Money>()
                .map_err(|e| format!("invalid price: {e}"))?;
            let date = need(row.date, "date")?
                .parse::<NaiveDate>()
                .map_err(|e| format!("invalid date: {e}"))?;
            Ok(LedgerEvent::Submit {
                plan: need(row.plan, "plan")?,
                amount,
                reference: need(row.reference, "reference")?,
                date,
                note: row.note.filter(|n| !n.trim().is_empty()),
            })
        }
        "approve" => Ok(LedgerEvent::Approve {
            reference: need(row.reference, "reference")?,
        }),
        "reject" => Ok(LedgerEvent::Reject {
            reference: need(row.reference, "reference")?,
        }),
        "set_credits" => Ok(LedgerEvent::SetCredits {
            email: need(row.email, "email")?,
            credits: parse_credits(&need(row.amount, "amount")?)?,
        }),
        "delete" => Ok(LedgerEvent::Delete {
            email: need(row.email, "email")?,
        }),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_credits(raw: &str) -> Result<u64, String> {
    raw.parse()
        .map_err(|_| format!("invalid credit amount: {raw}"))
}
