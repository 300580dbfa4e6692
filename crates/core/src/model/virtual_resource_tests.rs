// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn mac_addr_displays_lowercase_colon_separated() {
    let mac = MacAddr::new([0x02, 0x11, 0x22, 0xaa, 0xbb, 0xcc]);
    assert_eq!(mac.to_string(), "02:11:22:aa:bb:cc");
}

#[test]
fn virtual_resources_are_distinguishable_variants() {
    let vip = VirtualResource::VirtualIp(VirtualIp {
        address: "203.0.113.5/32".parse().unwrap(),
        interface: "wan0".into(),
        label: None,
    });
    let vmac = VirtualResource::VirtualMac(VirtualMac {
        interface: "wan0".into(),
        address: None,
        dhcp: true,
    });
    assert_ne!(vip, vmac);
}
