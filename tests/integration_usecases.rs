use std::fs;

use imager_ledger::{
    app,
    common::config::LedgerConfig,
    domain::{
        account::{Role, Tier},
        ledger::Ledger,
        payment::PaymentStatus,
        session::Session,
    },
    store::{DirStore, KeyValueStore, ACCOUNTS_KEY, SESSION_KEY},
};

fn config() -> LedgerConfig {
    let mut config = LedgerConfig::default();
    config.admin.email = "root@imager.test".into();
    config.admin.password = "letmein".into();
    config
}

fn replay_into(ledger: &mut Ledger, session: &mut Session, input_csv: &str) -> String {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input_csv.as_bytes());

    let mut out = Vec::<u8>::new();
    app::replay(ledger, session, &mut csv_reader, &mut out).expect("replay failed");
    String::from_utf8(out).expect("output was not valid UTF-8")
}

fn run_case(input_csv: &str) -> String {
    let mut ledger = Ledger::in_memory(config());
    let mut session = Session::default();
    replay_into(&mut ledger, &mut session, input_csv)
}

fn normalize_csv(s: &str) -> String {
    s.replace("\r\n", "\n")
        .lines()
        .map(|l| l.trim_end())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn purchase_and_approval_flow() {
    let input = fs::read_to_string("tests/fixtures/purchase_input.csv").unwrap();
    let expected = fs::read_to_string("tests/fixtures/purchase_expected.csv").unwrap();

    let actual = run_case(&input);

    assert_eq!(normalize_csv(&actual), normalize_csv(&expected));
}

#[test]
fn admin_delete_cascades_to_payments() {
    let input = fs::read_to_string("tests/fixtures/admin_delete_input.csv").unwrap();
    let expected = fs::read_to_string("tests/fixtures/admin_delete_expected.csv").unwrap();

    let mut ledger = Ledger::in_memory(config());
    let mut session = Session::default();
    let actual = replay_into(&mut ledger, &mut session, &input);

    assert_eq!(normalize_csv(&actual), normalize_csv(&expected));
    let payments = ledger.payments().list_all();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].transaction_id, "0xb1");
    assert_eq!(payments[0].status, PaymentStatus::Approved);
}

#[test]
fn state_survives_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let input = fs::read_to_string("tests/fixtures/purchase_input.csv").unwrap();

    let (accounts, payments) = {
        let store = DirStore::open(dir.path()).unwrap();
        let mut ledger = Ledger::open(Box::new(store), config());
        let mut session = ledger.restore_session();
        replay_into(&mut ledger, &mut session, &input);
        (ledger.accounts().clone(), ledger.payments().list_all())
    };

    let reopened = Ledger::open(Box::new(DirStore::open(dir.path()).unwrap()), config());
    assert_eq!(reopened.accounts(), &accounts);
    assert_eq!(reopened.payments().list_all(), payments);

    let session = reopened.restore_session();
    assert!(session.is_admin());
    assert!(reopened.find_account("root@imager.test").is_none());
}

#[test]
fn legacy_blobs_are_migrated_on_load() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(format!("{ACCOUNTS_KEY}.json")),
        r#"{"ana@x.com":{"id":"user_1","name":"Ana","email":"ana@x.com","credits":12.7},
            "bo@x.com":{"id":"user_2","name":"Bo","email":"bo@x.com","credits":-3,"tier":"Basic"}}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(format!("{SESSION_KEY}.json")),
        r#"{"id":"user_1","name":"Ana","email":"ana@x.com","credits":12.7}"#,
    )
    .unwrap();

    let store = DirStore::open(dir.path()).unwrap();
    let mut ledger = Ledger::open(Box::new(store), config());
    let mut session = ledger.restore_session();

    let ana = ledger.find_account("ana@x.com").unwrap();
    assert_eq!((ana.credits, ana.tier, ana.role), (12, Tier::Free, Role::Standard));
    let bo = ledger.find_account("bo@x.com").unwrap();
    assert_eq!((bo.credits, bo.tier), (0, Tier::Basic));
    assert_eq!(session.current().map(|a| a.credits), Some(12));

    // the next write stores the current envelope
    let report = replay_into(&mut ledger, &mut session, "command,amount\ndeduct,4\n");
    assert!(report.contains("ana@x.com,Ana,user,Free,8"));

    let raw = DirStore::open(dir.path()).unwrap().get(ACCOUNTS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["version"], 2);
    assert_eq!(value["data"]["ana@x.com"]["credits"], 8);
}

#[test]
fn corrupt_blobs_start_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(format!("{ACCOUNTS_KEY}.json")), "{not json").unwrap();

    let ledger = Ledger::open(Box::new(DirStore::open(dir.path()).unwrap()), config());

    assert!(ledger.accounts().is_empty());
    assert!(!ledger.restore_session().is_authenticated());
}
