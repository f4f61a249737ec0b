mod common;

use common::{BOTTLE_CAPS, STIMPAK, SaveFixture};
use pipboy_core::items::{NoItems, WellKnownItems};
use pipboy_core::model::PerkEntry;
use pipboy_core::projection::{Projection, TraitEntry, plan_edits};
use pipboy_core::query::{CapabilityIssue, capabilities};
use pipboy_core::{
    EditOp, EditRejection, GameVariant, PlanError, ScalarField, apply_edits, decode, encode,
};

#[test]
fn projection_serializes_and_reads_back() {
    let model = decode(&SaveFixture::fallout1().build(), None).expect("decode");
    let projection = Projection::from_model(&model, &WellKnownItems::new(GameVariant::Fallout1));

    let value = serde_json::to_value(&projection).expect("to json");
    assert_eq!(value["game"], "Fallout1");
    assert_eq!(value["name"], "Albert");
    assert_eq!(value["game_date"]["year"], 2161);
    assert_eq!(value["inventory"][0]["name"], "Stimpak");
    assert_eq!(value["inventory"][1]["quantity"], 250);
    assert_eq!(value["traits"][1]["name"], "Gifted");
    assert_eq!(value["next_level_xp"], 10_000);

    let back: Projection = serde_json::from_value(value).expect("from json");
    assert_eq!(back, projection);
}

#[test]
fn unknown_fields_are_rejected() {
    let model = decode(&SaveFixture::fallout1().build(), None).expect("decode");
    let mut value =
        serde_json::to_value(Projection::from_model(&model, &NoItems)).expect("to json");
    value["luck_charm"] = serde_json::json!(true);

    let err = serde_json::from_value::<Projection>(value).expect_err("unknown field");
    assert!(err.to_string().contains("luck_charm"));
}

#[test]
fn unchanged_projection_plans_nothing() {
    for fixture in [SaveFixture::fallout1(), SaveFixture::fallout2()] {
        let model = decode(&fixture.build(), None).expect("decode");
        let projection = Projection::from_model(&model, &WellKnownItems::new(model.variant()));
        let plan = plan_edits(&model, &projection).expect("plan");
        assert!(plan.is_empty(), "{:?}", plan.ops);
        assert!(plan.ignored.is_empty());
    }
}

#[test]
fn edited_projection_becomes_typed_ops() {
    let bytes = SaveFixture::fallout1().build();
    let mut model = decode(&bytes, None).expect("decode");

    let mut submitted = Projection::from_model(&model, &NoItems);
    submitted.karma = 200;
    submitted.special[0].base = 7;
    submitted.perks.retain(|perk| perk.index != 12);
    submitted.perks.push(PerkEntry {
        index: 5,
        name: "Bonus Rate of Fire".to_string(),
        rank: 1,
    });
    submitted.inventory.retain(|line| line.pid != STIMPAK);
    submitted.inventory[0].quantity = 300;

    let plan = plan_edits(&model, &submitted).expect("plan");
    assert!(plan.ignored.is_empty(), "{:?}", plan.ignored);
    assert_eq!(
        plan.ops,
        vec![
            EditOp::SetScalar(ScalarField::Karma, 200),
            EditOp::SetAttributeBase(0, 7),
            EditOp::ClearPerk(12),
            EditOp::SetPerk(5, 1),
            EditOp::SetInventoryQuantity(BOTTLE_CAPS, 300),
            EditOp::RemoveInventory(STIMPAK, None),
        ]
    );

    apply_edits(&mut model, &plan.ops).expect("apply plan");
    let again = decode(&encode(&model).expect("encode"), None).expect("re-decode");
    assert_eq!(again.karma(), 200);
    assert_eq!(again.special()[0].base, 7);
    let perks: Vec<usize> = again.perks().iter().map(|perk| perk.index).collect();
    assert_eq!(perks, vec![0, 5]);
    assert_eq!(again.inventory().len(), 1);
    assert_eq!(again.inventory()[0].quantity, 300);
}

#[test]
fn read_only_changes_are_ignored() {
    let model = decode(&SaveFixture::fallout2().build(), None).expect("decode");
    let mut submitted = Projection::from_model(&model, &NoItems);
    submitted.name = "Chosen One".to_string();
    submitted.kill_counts[7].count = 99;
    submitted.special[1].bonus = 3;

    let plan = plan_edits(&model, &submitted).expect("plan");
    assert!(plan.is_empty());
    assert_eq!(
        plan.ignored,
        vec![
            "name".to_string(),
            "kill_counts".to_string(),
            "special.Perception.bonus".to_string(),
        ]
    );
}

#[test]
fn special_total_may_follow_an_edited_base() {
    let model = decode(&SaveFixture::fallout1().build(), None).expect("decode");
    let mut submitted = Projection::from_model(&model, &NoItems);
    let strength = &mut submitted.special[0];
    strength.base = 8;
    strength.total = 8 + strength.bonus;

    let plan = plan_edits(&model, &submitted).expect("plan");
    assert!(plan.ignored.is_empty(), "{:?}", plan.ignored);
    assert_eq!(plan.ops, vec![EditOp::SetAttributeBase(0, 8)]);

    submitted.special[0].total += 1;
    let plan = plan_edits(&model, &submitted).expect("plan");
    assert_eq!(plan.ignored, vec!["special.Strength.bonus".to_string()]);
}

#[test]
fn swapped_traits_clear_before_setting() {
    let mut model = decode(&SaveFixture::fallout2().build(), None).expect("decode");
    let mut submitted = Projection::from_model(&model, &NoItems);
    submitted.traits = vec![
        TraitEntry {
            index: 14,
            name: "Skilled".to_string(),
        },
        TraitEntry {
            index: 1,
            name: "Bruiser".to_string(),
        },
    ];

    let plan = plan_edits(&model, &submitted).expect("plan");
    assert_eq!(
        plan.ops,
        vec![
            EditOp::SetTraitSlot {
                slot: 0,
                index: None
            },
            EditOp::SetTraitSlot {
                slot: 1,
                index: None
            },
            EditOp::SetTraitSlot {
                slot: 0,
                index: Some(14)
            },
            EditOp::SetTraitSlot {
                slot: 1,
                index: Some(1)
            },
        ]
    );
    apply_edits(&mut model, &plan.ops).expect("apply");
    assert_eq!(model.trait_slots(), Some([14, 1]));
}

#[test]
fn age_and_gender_round_trip_through_the_plan() {
    let model = decode(&SaveFixture::fallout2().build(), None).expect("decode");
    let mut submitted = Projection::from_model(&model, &NoItems);
    submitted.age = 25;
    submitted.gender = pipboy_core::Gender::Male;

    let plan = plan_edits(&model, &submitted).expect("plan");
    assert_eq!(
        plan.ops,
        vec![
            EditOp::SetScalar(ScalarField::Gender, 0),
            EditOp::SetScalar(ScalarField::Age, 25),
        ]
    );
}

#[test]
fn plan_rejects_mismatched_or_oversized_projections() {
    let fo1 = decode(&SaveFixture::fallout1().build(), None).expect("fallout 1");
    let fo2 = decode(&SaveFixture::fallout2().build(), None).expect("fallout 2");

    let projection = Projection::from_model(&fo1, &NoItems);
    assert_eq!(
        plan_edits(&fo2, &projection),
        Err(PlanError::VariantMismatch {
            model: GameVariant::Fallout2,
            projection: GameVariant::Fallout1,
        })
    );

    let mut crowded = projection.clone();
    crowded.traits.push(TraitEntry {
        index: 2,
        name: "Small Frame".to_string(),
    });
    assert_eq!(plan_edits(&fo1, &crowded), Err(PlanError::TooManyTraits(3)));
}

#[test]
fn new_pids_are_planned_but_refused() {
    let mut model = decode(&SaveFixture::fallout1().build(), None).expect("decode");
    let mut submitted = Projection::from_model(&model, &NoItems);
    submitted.inventory.push(pipboy_core::projection::InventoryEntry {
        pid: 999,
        quantity: 1,
        name: None,
        weight: None,
    });

    let plan = plan_edits(&model, &submitted).expect("plan");
    assert_eq!(plan.ops, vec![EditOp::AddInventory(999, 1)]);

    let err = apply_edits(&mut model, &plan.ops).expect_err("no fabrication");
    assert_eq!(err.reason, EditRejection::MissingItem { pid: 999 });
}

#[test]
fn capabilities_flag_degraded_saves() {
    let model = decode(&SaveFixture::fallout2().build(), None).expect("decode");
    let caps = capabilities(&model);
    assert!(caps.can_query && caps.can_plan_edits && caps.can_apply_edits);
    assert_eq!(caps.issues, vec![CapabilityIssue::LowConfidenceLayout]);

    let bytes = SaveFixture::fallout1().build_with_cut_traits();
    let model = decode(&bytes, None).expect("decode");
    assert!(
        capabilities(&model)
            .issues
            .contains(&CapabilityIssue::TraitsUnavailable)
    );
}
