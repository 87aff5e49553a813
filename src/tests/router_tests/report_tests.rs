use crate::config::ShareMode;
use crate::tests::utils::{body_string, get, make_app, record, stamp};

#[test]
fn report_view_shows_one_record() {
    let app = make_app(
        "report_view",
        ShareMode::Download,
        vec![
            record("-Nabc", "12 Mabini St", Some("Ana Cruz"), Some(stamp(1, 9))),
            record("-Nxyz", "99 Other St", None, None),
        ],
    );

    let mut resp = get(&app, "/report?id=-Nabc");
    assert_eq!(resp.status(), 200);
    let html = body_string(&mut resp);
    assert!(html.contains("12 Mabini St"));
    assert!(html.contains("Ana Cruz"));
    assert!(!html.contains("99 Other St"));

    let html = body_string(&mut get(&app, "/report?id=-Nxyz"));
    assert!(html.contains("No Owner Name Available"));
}

#[test]
fn unknown_or_missing_id() {
    let app = make_app("report_missing", ShareMode::Download, vec![]);
    assert_eq!(get(&app, "/report?id=-Nnope").status(), 404);
    assert_eq!(get(&app, "/report").status(), 400);
}
