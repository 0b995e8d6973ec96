use proptest::prelude::*;

use referendum_types::{AccountName, Timestamp, VoteSide};

proptest! {
    /// Any string built from the allowed alphabet, 1-12 chars, not ending in '.', parses.
    #[test]
    fn well_formed_names_parse(
        body in "[a-z1-5.]{0,11}",
        last in "[a-z1-5]",
    ) {
        let raw = format!("{body}{last}");
        let name = AccountName::parse(raw.clone());
        prop_assert!(name.is_ok(), "{} should parse", raw);
        let name = name.unwrap();
        prop_assert_eq!(name.as_str(), raw.as_str());
    }

    /// Names longer than twelve characters never parse.
    #[test]
    fn long_names_rejected(raw in "[a-z]{13,24}") {
        prop_assert!(AccountName::parse(raw).is_err());
    }

    /// Ordering of parsed names agrees with byte ordering of their keys.
    #[test]
    fn name_order_is_key_order(a in "[a-z1-5]{1,12}", b in "[a-z1-5]{1,12}") {
        let na = AccountName::new(a.clone());
        let nb = AccountName::new(b.clone());
        prop_assert_eq!(na.cmp(&nb), na.as_bytes().cmp(nb.as_bytes()));
    }

    /// Only the two defined codes map to a side.
    #[test]
    fn side_codes(code in 0u8..=255) {
        let side = VoteSide::try_from(code);
        prop_assert_eq!(side.is_ok(), code <= 1);
        if let Ok(side) = side {
            prop_assert_eq!(side.code(), code);
        }
    }

    /// Account names survive the bincode encoding used by the stores.
    #[test]
    fn account_name_bincode(raw in "[a-z1-5]{1,12}") {
        let name = AccountName::new(raw);
        let encoded = bincode::serialize(&name).unwrap();
        let decoded: AccountName = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, name);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// Shifting forward never moves a timestamp backward.
    #[test]
    fn plus_secs_monotonic(start in 0u64..u64::MAX, delta in 0u64..u64::MAX) {
        let t = Timestamp::new(start);
        prop_assert!(t.plus_secs(delta) >= t);
    }
}
