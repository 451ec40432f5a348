#![forbid(unsafe_code)]

use proptest::prelude::*;

use noor_kernel_contracts::member::{MemberId, MemberProfile};
use noor_kernel_contracts::progress::{PositionRecord, QuranPosition};
use noor_kernel_contracts::UnixTimeMs;
use noor_storage::{decode, decode_or_default, encode};

// Latin and Arabic letters with inner spaces; never blank.
fn display_name() -> impl Strategy<Value = String> {
    "[a-zA-Z\u{0621}-\u{064A}][a-zA-Z\u{0621}-\u{064A} ]{0,30}[a-zA-Z\u{0621}-\u{064A}]"
}

fn record() -> impl Strategy<Value = PositionRecord> {
    (
        "m-[a-z0-9]{1,24}",
        display_name(),
        proptest::option::of("/avatars/[a-z0-9_]{1,12}\\.png"),
        0u8..=30,
        1u8..=114,
        1u32..=u32::MAX,
        any::<u64>(),
    )
        .prop_map(|(id, name, avatar, part, section, verse, at)| {
            PositionRecord::v1(
                MemberId::new(id).unwrap(),
                name,
                avatar,
                QuranPosition::new(part, section, verse).unwrap(),
                UnixTimeMs(at),
            )
            .unwrap()
        })
}

fn profile() -> MemberProfile {
    MemberProfile::v1(MemberId::new("m-amna").unwrap(), "Amna", None).unwrap()
}

fn check_fallback(text: &str) -> Result<(), TestCaseError> {
    let out = decode_or_default(text, &profile());
    match decode(text) {
        Ok(decoded) => prop_assert_eq!(out, decoded),
        Err(_) => {
            prop_assert_eq!(out.position.progress_key(), (0, 1, 1));
            prop_assert_eq!(out, PositionRecord::starting_for(&profile()));
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn decode_inverts_encode(r in record()) {
        prop_assert_eq!(decode(&encode(&r)).unwrap(), r);
    }

    #[test]
    fn decode_or_default_accepts_any_text(text in any::<String>()) {
        check_fallback(&text)?;
    }

    #[test]
    fn decode_or_default_accepts_cut_records(r in record(), keep in 0usize..200) {
        let cut: String = encode(&r).chars().take(keep).collect();
        check_fallback(&cut)?;
    }
}
