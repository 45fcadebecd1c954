// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subnet carving properties

use proptest::prelude::*;
use rim_infrastructure::domain::Ipv4Cidr;

proptest! {
    #[test]
    fn prop_carved_blocks_stay_inside_and_do_not_overlap(
        first in 0u32..256,
        second in 0u32..256,
    ) {
        let vpc: Ipv4Cidr = "10.0.0.0/16".parse().expect("valid CIDR");

        let a = vpc.subnet(24, first).expect("index in range");
        let b = vpc.subnet(24, second).expect("index in range");

        prop_assert!(vpc.contains(a.address()));
        prop_assert!(vpc.contains(b.address()));
        prop_assert_eq!(first == second, a == b);
        prop_assert_eq!(a.prefix_length(), 24);
    }

    #[test]
    fn prop_out_of_range_index_is_rejected(index in 256u32..10_000) {
        let vpc: Ipv4Cidr = "10.0.0.0/16".parse().expect("valid CIDR");

        prop_assert!(vpc.subnet(24, index).is_err());
    }
}
