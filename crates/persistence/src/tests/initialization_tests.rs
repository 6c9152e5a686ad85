// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Persistence;

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first: Persistence = Persistence::new_in_memory().unwrap();
    let mut second: Persistence = Persistence::new_in_memory().unwrap();

    super::seed_marketplace(&mut first, false);

    assert!(first.get_user(1).unwrap().is_some());
    assert!(second.get_user(1).unwrap().is_none());
}

#[test]
fn test_foreign_keys_are_enforced() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence.verify_foreign_key_enforcement().unwrap();

    let result = persistence.insert_participant(&crate::NewParticipantProfile {
        user_id: 999,
        ndis_number: None,
        plan_manager_id: None,
        bill_to_type: ndis_market_domain::BillToType::SelfManaged,
    });

    assert!(result.is_err());
}
