#![no_main]

//! Fuzz target for paging query parsing.
//!
//! Arbitrary query pairs must always produce a bounded page request whose
//! ORDER BY clause only names whitelisted columns.

use libfuzzer_sys::fuzz_target;

use helpdesk::paging::PagingConfig;

const COLUMNS: &[(&str, &str)] = &[("id", "id"), ("issue", "issue"), ("dateCreated", "date_created")];

fuzz_target!(|params: Vec<(String, String)>| {
    let config = PagingConfig::new(20, 100);
    let request = config.page_request(&params);

    assert!(request.size >= 1 && request.size <= 100);
    assert!(request.offset() >= 0);

    for clause in request.order_by(COLUMNS).split(", ") {
        let column = clause.split(' ').next().unwrap_or_default();
        assert!(COLUMNS.iter().any(|(_, c)| *c == column), "{}", clause);
    }
});
