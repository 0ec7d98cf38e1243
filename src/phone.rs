//! Phone-number helpers: JID formatting and the country-code to
//! mobile-country-code mapping the auth blob embeds.

use crate::consts::SERVER_DOMAIN;

/// Normalize an address to a bare JID. Plain numbers get the user domain;
/// anything already carrying a domain is passed through.
pub fn to_jid(addr: &str) -> String {
    if addr.contains('@') {
        addr.to_string()
    } else {
        format!("{addr}@{SERVER_DOMAIN}")
    }
}

/// MCC for the phone number's country calling code, longest prefix first.
/// Unknown prefixes map to `"000"`; the server only uses this field for
/// coarse client telemetry.
pub fn mcc_for(phone_number: &str) -> &'static str {
    const TABLE: &[(&str, &str)] = &[
        // three-digit codes
        ("234", "621"),
        ("351", "268"),
        ("358", "244"),
        ("380", "255"),
        ("972", "425"),
        // two-digit codes
        ("20", "602"),
        ("27", "655"),
        ("30", "202"),
        ("31", "204"),
        ("32", "206"),
        ("33", "208"),
        ("34", "214"),
        ("39", "222"),
        ("41", "228"),
        ("43", "232"),
        ("44", "234"),
        ("45", "238"),
        ("46", "240"),
        ("47", "242"),
        ("48", "260"),
        ("49", "262"),
        ("52", "334"),
        ("54", "722"),
        ("55", "724"),
        ("57", "732"),
        ("58", "734"),
        ("60", "502"),
        ("61", "505"),
        ("62", "510"),
        ("63", "515"),
        ("64", "530"),
        ("65", "525"),
        ("66", "520"),
        ("81", "440"),
        ("82", "450"),
        ("84", "452"),
        ("86", "460"),
        ("90", "286"),
        ("91", "404"),
        ("92", "410"),
        // one-digit codes
        ("1", "310"),
        ("7", "250"),
    ];

    for len in (1..=3).rev() {
        if let Some((_, mcc)) = TABLE
            .iter()
            .find(|(cc, _)| cc.len() == len && phone_number.as_bytes().starts_with(cc.as_bytes()))
        {
            return mcc;
        }
    }
    "000"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_jid_plain_number() {
        assert_eq!(to_jid("15555215554"), "15555215554@s.whatsapp.net");
    }

    #[test]
    fn test_to_jid_passthrough() {
        assert_eq!(to_jid("12345-6789@g.us"), "12345-6789@g.us");
    }

    #[test]
    fn test_mcc_longest_prefix() {
        assert_eq!(mcc_for("15555215554"), "310");
        assert_eq!(mcc_for("4915112345678"), "262");
        assert_eq!(mcc_for("972501234567"), "425");
        assert_eq!(mcc_for("999123"), "000");
    }

    #[test]
    fn test_mcc_tolerates_non_ascii_input() {
        assert_eq!(mcc_for("＋4915112345678"), "000");
        assert_eq!(mcc_for("ü"), "000");
        assert_eq!(mcc_for(""), "000");
    }
}
