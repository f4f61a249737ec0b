mod common;

use common::{BOTTLE_CAPS, STIMPAK, SaveFixture, differing_offsets, read_i32};
use pipboy_core::items::NoItems;
use pipboy_core::layout::SectionId;
use pipboy_core::model::InventoryLine;
use pipboy_core::projection::Projection;
use pipboy_core::{
    EditOp, EditRejection, Gender, Model, ScalarField, apply_edits, decode, encode,
};

fn section_start(model: &Model, id: SectionId) -> usize {
    model.layout().get(id).expect("section present").range.start
}

fn edited(bytes: &[u8], ops: &[EditOp]) -> (Model, Vec<u8>) {
    let mut model = decode(bytes, None).expect("decode");
    apply_edits(&mut model, ops).expect("edits accepted");
    let out = encode(&model).expect("encode");
    (model, out)
}

#[test]
fn karma_edit_touches_only_the_karma_word() {
    let bytes = SaveFixture::fallout1().build();
    let (model, out) = edited(&bytes, &[EditOp::SetScalar(ScalarField::Karma, 151)]);

    let karma = section_start(&model, SectionId::Handler(13)) + 16;
    let changed = differing_offsets(&bytes, &out);
    assert!(!changed.is_empty());
    assert!(changed.iter().all(|&offset| (karma..karma + 4).contains(&offset)));
    assert_eq!(read_i32(&out, karma), 151);

    let again = decode(&out, None).expect("re-decode");
    assert_eq!(again.karma(), 151);
}

#[test]
fn experience_is_written_to_both_records() {
    let bytes = SaveFixture::fallout2().build();
    let (_, out) = edited(&bytes, &[EditOp::SetScalar(ScalarField::Experience, 7000)]);

    let again = decode(&out, None).expect("re-decode");
    assert_eq!(again.experience(), 7000);
    assert_eq!(again.proto().experience, 7000);
}

#[test]
fn strength_edit_updates_the_derived_view() {
    let bytes = SaveFixture::fallout1().build();
    let mut model = decode(&bytes, None).expect("decode");
    apply_edits(&mut model, &[EditOp::SetAttributeBase(0, 8)]).expect("strength");
    assert_eq!(model.special()[0].base, 8);
    assert_eq!(model.special()[0].total, 8);

    let out = encode(&model).expect("encode");
    let strength = section_start(&model, SectionId::Handler(6)) + 8;
    let changed = differing_offsets(&bytes, &out);
    assert!(changed.iter().all(|&offset| (strength..strength + 4).contains(&offset)));

    // Derived bases are left for the game to recompute.
    let again = decode(&out, None).expect("re-decode");
    assert_eq!(again.proto().base_stats[7], 29);
}

#[test]
fn special_base_must_stay_in_range() {
    let mut model = decode(&SaveFixture::fallout1().build(), None).expect("decode");
    let err = apply_edits(&mut model, &[EditOp::SetAttributeBase(2, 11)]).expect_err("too high");
    assert!(matches!(
        err.reason,
        EditRejection::OutOfRange { value: 11, .. }
    ));
    assert_eq!(model.special()[2].base, 4);
}

#[test]
fn age_edit_recovers_the_stored_base() {
    let bytes = SaveFixture::fallout2().build();
    let (model, out) = edited(&bytes, &[EditOp::SetScalar(ScalarField::Age, 30)]);
    assert_eq!(model.age().base, 28);
    assert_eq!(model.age().total, 30);

    let again = decode(&out, None).expect("re-decode");
    assert_eq!(again.age().total, 30);
    assert_eq!(again.proto().base_stats[33], 28);
}

#[test]
fn age_below_elapsed_years_is_rejected() {
    let mut model = decode(&SaveFixture::fallout2().build(), None).expect("decode");
    let err = apply_edits(&mut model, &[EditOp::SetScalar(ScalarField::Age, 1)])
        .expect_err("negative base");
    assert!(matches!(err.reason, EditRejection::OutOfRange { .. }));
    assert_eq!(model.age().total, 22);
}

#[test]
fn hit_points_patch_in_place() {
    let bytes = SaveFixture::fallout1().build();
    let (model, out) = edited(&bytes, &[EditOp::SetScalar(ScalarField::HitPoints, 10)]);

    let hp = section_start(&model, SectionId::Handler(5)) + 116;
    assert_eq!(out.len(), bytes.len());
    assert!(
        differing_offsets(&bytes, &out)
            .iter()
            .all(|&offset| (hp..hp + 4).contains(&offset))
    );
    assert_eq!(decode(&out, None).expect("re-decode").hit_points(), Some(10));
}

#[test]
fn gender_and_level() {
    let bytes = SaveFixture::fallout1().build();
    let (_, out) = edited(
        &bytes,
        &[
            EditOp::SetScalar(ScalarField::Gender, 1),
            EditOp::SetScalar(ScalarField::Level, 5),
        ],
    );
    let again = decode(&out, None).expect("re-decode");
    assert_eq!(again.gender(), Gender::Female);
    assert_eq!(again.level(), 5);
    assert_eq!(again.next_level_xp(), 15_000);
}

#[test]
fn batch_stops_at_the_first_rejected_op() {
    let mut model = decode(&SaveFixture::fallout1().build(), None).expect("decode");
    let err = apply_edits(
        &mut model,
        &[
            EditOp::SetScalar(ScalarField::Karma, 5),
            EditOp::SetScalar(ScalarField::Level, 0),
            EditOp::SetScalar(ScalarField::Karma, 7),
        ],
    )
    .expect_err("level 0");

    assert_eq!(err.index, 1);
    assert!(err.op.contains("Level"));
    assert_eq!(model.karma(), 5);
    assert_eq!(model.level(), 4);
}

#[test]
fn traits_can_be_swapped_but_not_duplicated() {
    let mut model = decode(&SaveFixture::fallout2().build(), None).expect("decode");

    let err = apply_edits(
        &mut model,
        &[EditOp::SetTraitSlot {
            slot: 1,
            index: Some(1),
        }],
    )
    .expect_err("duplicate");
    assert_eq!(err.reason, EditRejection::DuplicateTrait(1));

    apply_edits(
        &mut model,
        &[
            EditOp::SetTraitSlot {
                slot: 1,
                index: Some(14),
            },
            EditOp::SetTraitSlot {
                slot: 0,
                index: None,
            },
        ],
    )
    .expect("trait edits");
    let out = encode(&model).expect("encode");
    let again = decode(&out, None).expect("re-decode");
    assert_eq!(again.trait_slots(), Some([-1, 14]));
    assert_eq!(again.traits()[0].name, Some("Skilled"));
}

#[test]
fn trait_edits_need_readable_trait_sections() {
    let bytes = SaveFixture::fallout1().build_with_cut_traits();
    let mut model = decode(&bytes, None).expect("decode");

    let err = apply_edits(
        &mut model,
        &[EditOp::SetTraitSlot {
            slot: 0,
            index: Some(1),
        }],
    )
    .expect_err("no traits");
    assert_eq!(err.reason, EditRejection::Unavailable("traits"));
}

#[test]
fn perks_are_checked_against_the_table() {
    let bytes = SaveFixture::fallout1().build();
    let mut model = decode(&bytes, None).expect("decode");

    let err = apply_edits(&mut model, &[EditOp::SetPerk(200, 1)]).expect_err("no perk 200");
    assert!(matches!(
        err.reason,
        EditRejection::UnknownIndex { table: "perk", .. }
    ));
    let err = apply_edits(&mut model, &[EditOp::SetPerk(5, 21)]).expect_err("rank too high");
    assert!(matches!(err.reason, EditRejection::OutOfRange { .. }));

    apply_edits(&mut model, &[EditOp::SetPerk(5, 1), EditOp::ClearPerk(12)]).expect("perks");
    let again = decode(&encode(&model).expect("encode"), None).expect("re-decode");
    let perks: Vec<(usize, i32)> = again.perks().iter().map(|p| (p.index, p.rank)).collect();
    assert_eq!(perks, vec![(0, 1), (5, 1)]);
}

#[test]
fn removing_more_than_held_drops_the_line() {
    let bytes = SaveFixture::fallout1().build();
    let (model, out) = edited(&bytes, &[EditOp::RemoveInventory(STIMPAK, Some(5))]);
    assert_eq!(out.len(), bytes.len() - 92);
    assert_eq!(
        model.layout().file_len,
        bytes.len(),
        "the model keeps its decoded layout"
    );

    let again = decode(&out, None).expect("re-decode");
    assert_eq!(
        again.inventory(),
        vec![InventoryLine {
            pid: BOTTLE_CAPS,
            quantity: 250
        }]
    );
    assert_eq!(again.level(), 4);
    assert_eq!(again.karma(), 150);
    assert_eq!(encode(&again).expect("encode again"), out);
}

#[test]
fn quantity_edits_keep_the_record_size() {
    let bytes = SaveFixture::fallout2().build();
    let (_, out) = edited(
        &bytes,
        &[
            EditOp::SetInventoryQuantity(BOTTLE_CAPS, 1000),
            EditOp::AddInventory(STIMPAK, 3),
        ],
    );
    assert_eq!(out.len(), bytes.len());

    let again = decode(&out, None).expect("re-decode");
    assert_eq!(
        again.inventory(),
        vec![
            InventoryLine {
                pid: STIMPAK,
                quantity: 5
            },
            InventoryLine {
                pid: BOTTLE_CAPS,
                quantity: 1000
            },
        ]
    );
}

#[test]
fn unknown_pids_are_never_fabricated() {
    let mut model = decode(&SaveFixture::fallout1().build(), None).expect("decode");
    for op in [
        EditOp::AddInventory(999, 1),
        EditOp::SetInventoryQuantity(999, 1),
        EditOp::RemoveInventory(999, None),
    ] {
        let err = apply_edits(&mut model, &[op]).expect_err("missing pid");
        assert_eq!(err.reason, EditRejection::MissingItem { pid: 999 });
    }
}

#[test]
fn fallout2_inventory_rewrite_keeps_trailing_bytes() {
    let mut fixture = SaveFixture::fallout2();
    fixture.h5_trailer = vec![0; 8];
    let bytes = fixture.build();

    let (_, out) = edited(&bytes, &[EditOp::RemoveInventory(STIMPAK, None)]);
    assert_eq!(out.len(), bytes.len() - 92);

    let again = decode(&out, None).expect("re-decode");
    assert_eq!(again.inventory().len(), 1);
    assert_eq!(again.proto().base_stats[..7], [7, 6, 5, 4, 8, 6, 5]);
    assert_eq!(again.karma(), -20);
}

#[test]
fn setting_every_field_to_its_current_value_changes_nothing() {
    let bytes = SaveFixture::fallout1().build();
    let mut ops = vec![
        EditOp::SetScalar(ScalarField::Level, 4),
        EditOp::SetScalar(ScalarField::Experience, 6130),
        EditOp::SetScalar(ScalarField::SkillPoints, 7),
        EditOp::SetScalar(ScalarField::Karma, 150),
        EditOp::SetScalar(ScalarField::Reputation, 2),
        EditOp::SetScalar(ScalarField::HitPoints, 29),
        EditOp::SetScalar(ScalarField::Age, 25),
        EditOp::SetScalar(ScalarField::Gender, 0),
        EditOp::SetTraitSlot {
            slot: 0,
            index: Some(7),
        },
        EditOp::SetTraitSlot {
            slot: 1,
            index: Some(15),
        },
        EditOp::SetPerk(0, 1),
        EditOp::SetPerk(12, 2),
        EditOp::SetInventoryQuantity(STIMPAK, 3),
        EditOp::SetInventoryQuantity(BOTTLE_CAPS, 250),
    ];
    for (index, base) in [6, 8, 4, 2, 9, 9, 9].into_iter().enumerate() {
        ops.push(EditOp::SetAttributeBase(index, base));
    }

    let (model, out) = edited(&bytes, &ops);
    assert_eq!(out, bytes);
    let fresh = decode(&bytes, None).expect("fresh decode");
    assert_eq!(
        Projection::from_model(&model, &NoItems),
        Projection::from_model(&fresh, &NoItems)
    );
}

#[test]
fn add_then_remove_restores_the_quantity() {
    let bytes = SaveFixture::fallout2().build();
    let (model, out) = edited(
        &bytes,
        &[
            EditOp::AddInventory(BOTTLE_CAPS, 40),
            EditOp::RemoveInventory(BOTTLE_CAPS, Some(40)),
        ],
    );
    assert_eq!(model.player().quantity_of(BOTTLE_CAPS), 75);
    assert_eq!(out, bytes);
}
