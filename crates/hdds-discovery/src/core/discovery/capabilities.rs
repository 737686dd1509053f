// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in endpoint capability bits advertised in SPDP, and the vendor
//! interoperability fixups applied to them on reception.

use super::VendorId;
use crate::protocol::discovery::constants::*;
use crate::protocol::discovery::ParticipantVersionInfo;

/// Standard builtin endpoint set plus the optional PrismTech extension set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndpointCapabilities {
    pub standard: u32,
    pub vendor: Option<u32>,
}

impl EndpointCapabilities {
    pub fn new(standard: u32, vendor: Option<u32>) -> Self {
        Self { standard, vendor }
    }

    pub fn has(&self, bits: u32) -> bool {
        self.standard & bits == bits
    }

    pub fn has_vendor(&self, bits: u32) -> bool {
        self.vendor.is_some_and(|v| v & bits == bits)
    }

    /// Both SEDP announcers present: the participant announces its own
    /// endpoints instead of relying on a privileged peer.
    pub fn has_sedp_announcers(&self) -> bool {
        self.has(BES_SEDP_ANNOUNCERS)
    }
}

/// RTI peers may omit the participant-message endpoints from their set
/// while still running them. Unless both are advertised, assume both.
pub fn fixup_rti_pmd(
    vendor: VendorId,
    assume_pmd: bool,
    caps: EndpointCapabilities,
) -> EndpointCapabilities {
    if vendor.is_rti() && !caps.has(BES_PMD_ENDPOINTS) && assume_pmd {
        log::trace!("[SPDP] assuming RTI participant has PMD endpoints");
        return EndpointCapabilities {
            standard: caps.standard | BES_PMD_ENDPOINTS,
            ..caps
        };
    }
    caps
}

/// Older PrismTech releases only advertised the CM participant endpoints
/// and implied the publisher/subscriber ones; releases that set
/// `PTBES_FIXED_0` advertise all of them explicitly.
pub fn fixup_prismtech_cm(
    version_info: Option<&ParticipantVersionInfo>,
    caps: EndpointCapabilities,
) -> EndpointCapabilities {
    let (Some(info), Some(mut set)) = (version_info, caps.vendor) else {
        return caps;
    };
    if info.flags & PTFL_PTBES_FIXED_0 != 0 {
        return caps;
    }
    if set & PTBES_CM_PARTICIPANT_READER != 0 {
        set |= PTBES_CM_PUBLISHER_READER | PTBES_CM_SUBSCRIBER_READER;
    }
    if set & PTBES_CM_PARTICIPANT_WRITER != 0 {
        set |= PTBES_CM_PUBLISHER_WRITER | PTBES_CM_SUBSCRIBER_WRITER;
    }
    EndpointCapabilities {
        vendor: Some(set),
        ..caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(flags: u32) -> ParticipantVersionInfo {
        ParticipantVersionInfo {
            flags,
            ..Default::default()
        }
    }

    #[test]
    fn test_rti_pmd_fixup() {
        let caps = EndpointCapabilities::new(BES_SEDP_ANNOUNCERS, None);

        let fixed = fixup_rti_pmd(VendorId::RTI, true, caps);
        assert!(fixed.has(BES_PMD_ENDPOINTS));
        assert!(fixed.has_sedp_announcers());

        assert_eq!(fixup_rti_pmd(VendorId::RTI, false, caps), caps);
        assert_eq!(fixup_rti_pmd(VendorId::EPROSIMA, true, caps), caps);

        // one PMD bit advertised: both assumed
        let partial = EndpointCapabilities::new(BES_PARTICIPANT_MESSAGE_DATA_WRITER, None);
        assert!(fixup_rti_pmd(VendorId::RTI, true, partial).has(BES_PMD_ENDPOINTS));

        let full = EndpointCapabilities::new(BES_PMD_ENDPOINTS, None);
        assert_eq!(fixup_rti_pmd(VendorId::RTI, true, full), full);
    }

    #[test]
    fn test_prismtech_cm_fixup() {
        let caps = EndpointCapabilities::new(
            BES_DEFAULT,
            Some(PTBES_CM_PARTICIPANT_READER | PTBES_CM_PARTICIPANT_WRITER),
        );

        let fixed = fixup_prismtech_cm(Some(&info(0)), caps);
        assert!(fixed.has_vendor(
            PTBES_CM_PUBLISHER_READER
                | PTBES_CM_SUBSCRIBER_READER
                | PTBES_CM_PUBLISHER_WRITER
                | PTBES_CM_SUBSCRIBER_WRITER
        ));
        assert_eq!(fixed.standard, BES_DEFAULT);

        // already fixed upstream
        assert_eq!(fixup_prismtech_cm(Some(&info(PTFL_PTBES_FIXED_0)), caps), caps);
        // no version info or no vendor set
        assert_eq!(fixup_prismtech_cm(None, caps), caps);
        let plain = EndpointCapabilities::new(BES_DEFAULT, None);
        assert_eq!(fixup_prismtech_cm(Some(&info(0)), plain), plain);
    }

    #[test]
    fn test_reader_only_cm_fixup() {
        let caps = EndpointCapabilities::new(0, Some(PTBES_CM_PARTICIPANT_READER));
        let fixed = fixup_prismtech_cm(Some(&info(0)), caps);
        assert!(fixed.has_vendor(PTBES_CM_PUBLISHER_READER));
        assert!(!fixed.has_vendor(PTBES_CM_PUBLISHER_WRITER));
        assert!(!fixed.has_sedp_announcers());
    }
}
