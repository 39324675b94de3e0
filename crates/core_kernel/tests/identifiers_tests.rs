//! Unit tests for the Identifiers module

use core_kernel::{BranchId, CreditAccountId, CreditTransactionId, CustomerId, DailyOperationId};
use uuid::Uuid;

mod credit_account_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(CreditAccountId::new(), CreditAccountId::new());
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = CreditAccountId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_without_prefix() {
        let uuid = Uuid::new_v4();
        let parsed: CreditAccountId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("CRA-not-a-uuid".parse::<CreditAccountId>().is_err());
    }

    #[test]
    fn test_json_is_bare_uuid() {
        let id = CreditAccountId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}

mod transaction_id_tests {
    use super::*;

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = CreditTransactionId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = CreditTransactionId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }
}

#[test]
fn test_prefixes() {
    assert_eq!(CustomerId::prefix(), "CUS");
    assert_eq!(BranchId::prefix(), "BRN");
    assert_eq!(CreditAccountId::prefix(), "CRA");
    assert_eq!(CreditTransactionId::prefix(), "CTX");
    assert_eq!(DailyOperationId::prefix(), "DOP");
}

#[test]
fn test_display_round_trip_for_all_ids() {
    let branch = BranchId::new();
    assert_eq!(branch.to_string().parse::<BranchId>().unwrap(), branch);

    let customer = CustomerId::new();
    assert!(customer.to_string().starts_with("CUS-"));
    assert_eq!(customer.to_string().parse::<CustomerId>().unwrap(), customer);
}
