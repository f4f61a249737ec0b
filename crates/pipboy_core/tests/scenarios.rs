mod common;

use common::{BOTTLE_CAPS, STIMPAK, SaveFixture};
use pipboy_core::model::InventoryLine;
use pipboy_core::query::{Field, FieldValue, read_field, read_header};
use pipboy_core::sections::SaveDate;
use pipboy_core::{Gender, GameVariant, decode};

#[test]
fn fallout1_header_and_character() {
    let model = decode(&SaveFixture::fallout1().build(), None).expect("decode");

    assert_eq!(model.name(), "Albert");
    assert_eq!(model.description(), "Necropolis");
    assert_eq!(model.map_filename(), "V13ENT.MAP");
    assert_eq!(model.map_id(), 12);
    assert_eq!(
        model.game_date(),
        SaveDate {
            year: 2161,
            month: 12,
            day: 5
        }
    );
    assert_eq!(
        model.save_date(),
        SaveDate {
            year: 1998,
            month: 3,
            day: 14
        }
    );
    assert_eq!(model.version(), [1, 1]);

    assert_eq!(model.gender(), Gender::Male);
    assert_eq!(model.level(), 4);
    assert_eq!(model.experience(), 6130);
    assert_eq!(model.next_level_xp(), 10_000);
    assert_eq!(model.skill_points(), 7);
    assert_eq!(model.karma(), 150);
    assert_eq!(model.reputation(), 2);
    assert_eq!(model.hit_points(), Some(29));
    assert_eq!(model.age().total, 25);
    assert_eq!(model.age().elapsed_years, 0);
}

#[test]
fn fallout1_structure() {
    let model = decode(&SaveFixture::fallout1().build(), None).expect("decode");

    assert_eq!(model.global_var_count(), 100);
    assert_eq!(model.map_files(), ["V13ENT.SAV", "DESERT1.SAV"]);
    assert_eq!(model.automap_size(), 2048);
    assert_eq!(model.center_tile(), common::CENTER_TILE);
    assert_eq!(model.party_member_count(), None);
    assert_eq!(model.ai_packet_count(), None);
    assert_eq!(model.game_difficulty(), None);
}

#[test]
fn fallout1_special_skills_and_tags() {
    let model = decode(&SaveFixture::fallout1().build(), None).expect("decode");

    let special = model.special();
    assert_eq!(special.len(), 7);
    assert_eq!(special[0].name, "Strength");
    assert_eq!(special[0].base, 6);
    assert_eq!(special[0].total, 6);
    assert_eq!(special[6].name, "Luck");
    assert_eq!(special[6].total, 9);

    assert_eq!(model.tagged_skills(), vec![0, 3, 14]);
    assert!(model.is_skill_tagged(14));
    assert!(!model.is_skill_tagged(1));

    let small_guns = &model.skills()[0];
    assert_eq!(small_guns.name, "Small Guns");
    assert_eq!(small_guns.raw, 10);
    assert_eq!(small_guns.tag_bonus, 30);

    let big_guns = &model.skills()[1];
    assert_eq!(big_guns.tag_bonus, 0);
    assert!(model.skills().iter().all(|skill| skill.total <= 300));
}

#[test]
fn fallout1_perks_traits_kills_inventory() {
    let model = decode(&SaveFixture::fallout1().build(), None).expect("decode");

    let perks: Vec<(String, i32)> = model
        .perks()
        .into_iter()
        .map(|perk| (perk.name, perk.rank))
        .collect();
    assert_eq!(
        perks,
        vec![("Awareness".to_string(), 1), ("Toughness".to_string(), 2)]
    );

    let traits: Vec<_> = model.traits().iter().map(|t| (t.index, t.name)).collect();
    assert_eq!(traits, vec![(7, Some("Fast Shot")), (15, Some("Gifted"))]);

    let kills = model.kills();
    assert_eq!(kills.len(), 16);
    assert_eq!((kills[0].name.as_str(), kills[0].count), ("Man", 4));
    assert_eq!((kills[7].name.as_str(), kills[7].count), ("Rat", 11));

    assert_eq!(
        model.inventory(),
        vec![
            InventoryLine {
                pid: STIMPAK,
                quantity: 3
            },
            InventoryLine {
                pid: BOTTLE_CAPS,
                quantity: 250
            },
        ]
    );
    assert!(model.warnings().is_empty());
}

#[test]
fn fallout2_character_and_structure() {
    let model = decode(&SaveFixture::fallout2().build(), None).expect("decode");

    assert_eq!(model.variant(), GameVariant::Fallout2);
    assert_eq!(model.gender(), Gender::Female);
    assert_eq!(model.karma(), -20);
    assert_eq!(model.hit_points(), Some(32));
    assert_eq!(model.game_difficulty(), Some(1));
    assert_eq!(model.party_member_count(), Some(1));
    assert_eq!(model.ai_packet_count(), Some(0));
    assert_eq!(model.global_var_count(), 10);
    assert_eq!(model.kill_counts().len(), 19);

    let traits: Vec<_> = model.traits().iter().map(|t| (t.slot, t.name)).collect();
    assert_eq!(traits, vec![(0, Some("Bruiser"))]);
}

#[test]
fn fallout2_age_includes_elapsed_years() {
    let model = decode(&SaveFixture::fallout2().build(), None).expect("decode");
    let age = model.age();
    assert_eq!(age.base, 20);
    assert_eq!(age.elapsed_years, 2);
    assert_eq!(age.total, 22);
}

#[test]
fn hit_points_are_listed_with_their_maximum() {
    let model = decode(&SaveFixture::fallout1().build(), None).expect("decode");
    let hp = model
        .derived_stats()
        .iter()
        .find(|stat| stat.name == "Hit Points")
        .expect("hit points entry");
    assert_eq!(hp.value, 29);
    assert_eq!(hp.max, Some(29));

    let max_ap = model
        .derived_stats()
        .iter()
        .find(|stat| stat.name == "Max AP")
        .expect("max ap entry");
    assert_eq!(max_ap.value, 9);
}

#[test]
fn single_field_reads() {
    let bytes = SaveFixture::fallout1().build();

    assert_eq!(
        read_field(&bytes, Field::Name, None).expect("name"),
        FieldValue::Text("Albert".to_string())
    );
    assert_eq!(
        read_field(&bytes, Field::Karma, None).expect("karma"),
        FieldValue::Int(150)
    );
    assert_eq!(
        read_field(&bytes, Field::MaxHitPoints, None).expect("max hp"),
        FieldValue::Int(29)
    );
    assert_eq!(
        read_field(&bytes, Field::Gender, None).expect("gender"),
        FieldValue::Text("Male".to_string())
    );
    assert_eq!(
        read_field(&bytes, Field::Game, None)
            .expect("game")
            .to_string(),
        "Fallout 1"
    );
}

#[test]
fn header_fields_survive_a_damaged_body() {
    let bytes = SaveFixture::fallout2().build();
    let truncated = &bytes[..common::HEADER_LEN + 16];

    let (variant, header) = read_header(truncated, None).expect("header only");
    assert_eq!(variant, GameVariant::Fallout2);
    assert_eq!(header.character_name, "Narg");
    assert_eq!(
        read_field(truncated, Field::GameDate, None)
            .expect("game date")
            .to_string(),
        "2241-07-25"
    );
    assert!(read_field(truncated, Field::Level, None).is_err());
}
