//! Synthetic `SAVE.DAT` images that walk the same section layout as saves
//! written by the games.

#![allow(dead_code)]

use pipboy_core::GameVariant;

pub const HEADER_LEN: usize = 30_051;
pub const PLAYER_PID: i32 = 0x0100_0000;
pub const STIMPAK: i32 = 40;
pub const BOTTLE_CAPS: i32 = 41;
pub const CENTER_TILE: i32 = 20_100;

pub const STAT_COUNT: usize = 35;
pub const SKILL_COUNT: usize = 18;

const PREVIEW_AND_PADDING: usize = 29_792 + 128;

#[derive(Debug, Clone)]
pub struct SaveFixture {
    pub variant: GameVariant,
    pub name: &'static str,
    pub description: &'static str,
    /// (year, month, day)
    pub save_date: (i16, i16, i16),
    pub game_date: (i16, i16, i16),
    pub game_time: u32,
    pub elevation: i16,
    pub map_id: i16,
    pub map: &'static str,
    pub global_vars: usize,
    pub maps: Vec<&'static str>,
    pub automap_size: i32,
    pub hp: i32,
    /// (quantity, pid)
    pub items: Vec<(i32, i32)>,
    pub h5_trailer: Vec<u8>,
    pub base_stats: [i32; STAT_COUNT],
    pub bonus_stats: [i32; STAT_COUNT],
    pub skills: [i32; SKILL_COUNT],
    pub proto_experience: i32,
    pub kills: Vec<i32>,
    pub tags: [i32; 4],
    /// (index, rank)
    pub perks: Vec<(usize, i32)>,
    pub combat_flags: u32,
    pub skill_points: i32,
    pub level: i32,
    pub experience: i32,
    pub reputation: i32,
    pub karma: i32,
    pub traits: [i32; 2],
    pub difficulty: i32,
    pub tail: Vec<u8>,
}

/// Base stats whose derived entries (7..=32) match the SPECIAL formulas.
fn consistent_stats(special: [i32; 7], age: i32, gender: i32) -> [i32; STAT_COUNT] {
    let [st, pe, en, _ch, _in, ag, lk] = special;
    let mut stats = [0; STAT_COUNT];
    stats[..7].copy_from_slice(&special);
    stats[7] = st + 2 * en + 15;
    stats[8] = ag / 2 + 5;
    stats[9] = ag;
    stats[11] = (st - 5).max(1);
    stats[12] = 25 * st + 25;
    stats[13] = 2 * pe;
    stats[14] = (en / 3).max(1);
    stats[15] = lk;
    stats[31] = 2 * en;
    stats[32] = 5 * en;
    stats[33] = age;
    stats[34] = gender;
    stats
}

impl SaveFixture {
    pub fn fallout1() -> Self {
        let mut skills = [0; SKILL_COUNT];
        skills[0] = 10;
        skills[14] = 5;
        Self {
            variant: GameVariant::Fallout1,
            name: "Albert",
            description: "Necropolis",
            save_date: (1998, 3, 14),
            game_date: (2161, 12, 5),
            game_time: 302_400,
            elevation: 0,
            map_id: 12,
            map: "V13ENT.MAP",
            global_vars: 100,
            maps: vec!["V13ENT.SAV", "DESERT1.SAV"],
            automap_size: 2048,
            hp: 29,
            items: vec![(3, STIMPAK), (250, BOTTLE_CAPS)],
            h5_trailer: Vec::new(),
            base_stats: consistent_stats([6, 8, 4, 2, 9, 9, 9], 25, 0),
            bonus_stats: [0; STAT_COUNT],
            skills,
            proto_experience: 6130,
            kills: {
                let mut kills = vec![0; 16];
                kills[0] = 4;
                kills[7] = 11;
                kills
            },
            tags: [0, 3, 14, -1],
            perks: vec![(0, 1), (12, 2)],
            combat_flags: 0x02,
            skill_points: 7,
            level: 4,
            experience: 6130,
            reputation: 2,
            karma: 150,
            traits: [7, 15],
            difficulty: 1,
            tail: (0..96u8).collect(),
        }
    }

    pub fn fallout2() -> Self {
        let mut skills = [0; SKILL_COUNT];
        skills[3] = 20;
        skills[8] = 15;
        Self {
            variant: GameVariant::Fallout2,
            name: "Narg",
            description: "Arroyo",
            save_date: (2004, 11, 2),
            game_date: (2241, 7, 25),
            game_time: 700_000_000,
            elevation: 1,
            map_id: 3,
            map: "ARTEMPLE.MAP",
            global_vars: 10,
            maps: vec!["ARTEMPLE.SAV", "ARVILLAG.SAV"],
            automap_size: 4096,
            hp: 32,
            items: vec![(2, STIMPAK), (75, BOTTLE_CAPS)],
            h5_trailer: Vec::new(),
            base_stats: consistent_stats([7, 6, 5, 4, 8, 6, 5], 20, 1),
            bonus_stats: [0; STAT_COUNT],
            skills,
            proto_experience: 1500,
            kills: {
                let mut kills = vec![0; 19];
                kills[7] = 3;
                kills
            },
            tags: [3, 8, 14, -1],
            perks: vec![(1, 1)],
            combat_flags: 0x02,
            skill_points: 12,
            level: 2,
            experience: 1500,
            reputation: 0,
            karma: -20,
            traits: [1, -1],
            difficulty: 1,
            tail: vec![0; 2048],
        }
    }

    pub fn with_karma(mut self, karma: i32) -> Self {
        self.karma = karma;
        self
    }

    /// A Fallout 1 save cut off inside the trait words, after the event
    /// queue.
    pub fn build_with_cut_traits(&self) -> Vec<u8> {
        assert_eq!(self.variant, GameVariant::Fallout1);
        assert!(self.tail.is_empty(), "the traits must be the last words");
        let mut bytes = self.build();
        bytes.truncate(bytes.len() - 4);
        bytes
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_header(&mut out);
        assert_eq!(out.len(), HEADER_LEN, "header length");

        push(&mut out, &[1]); // player combat id
        match self.variant {
            GameVariant::Fallout1 => {
                out.extend(std::iter::repeat_n(0, self.global_vars * 4 + 1));
                self.write_maps(&mut out);
                out.extend(std::iter::repeat_n(0, self.global_vars * 4 + 1));
            }
            GameVariant::Fallout2 => {
                out.extend(std::iter::repeat_n(0, self.global_vars * 4));
                self.write_maps(&mut out);
                out.extend(std::iter::repeat_n(0, self.global_vars * 4));
            }
        }

        self.write_player(&mut out);
        self.write_proto(&mut out);
        push(&mut out, &self.kills);
        push(&mut out, &self.tags);

        let perk_count = match self.variant {
            GameVariant::Fallout1 => 63,
            GameVariant::Fallout2 => 119,
        };
        let mut perks = vec![0; perk_count];
        for &(index, rank) in &self.perks {
            perks[index] = rank;
        }
        push(&mut out, &perks);
        out.extend_from_slice(&self.combat_flags.to_be_bytes());
        push(
            &mut out,
            &[
                self.skill_points,
                self.level,
                self.experience,
                self.reputation,
                self.karma,
            ],
        );

        match self.variant {
            GameVariant::Fallout1 => {
                push(&mut out, &[0]); // empty event queue
                push(&mut out, &self.traits);
            }
            GameVariant::Fallout2 => {
                push(&mut out, &self.traits);
                push(&mut out, &[0]); // automap flags
                push(&mut out, &[self.difficulty, 1, 0, 0, 0]);
            }
        }

        out.extend_from_slice(&self.tail);
        out
    }

    fn write_header(&self, out: &mut Vec<u8>) {
        fixed(out, b"FALLOUT SAVE FILE", 24);
        let version: [i16; 2] = match self.variant {
            GameVariant::Fallout1 => [1, 1],
            GameVariant::Fallout2 => [1, 2],
        };
        for word in version {
            out.extend_from_slice(&word.to_be_bytes());
        }
        out.push(b'R');
        fixed(out, self.name.as_bytes(), 32);
        fixed(out, self.description.as_bytes(), 30);

        let (year, month, day) = self.save_date;
        for word in [day, month, year] {
            out.extend_from_slice(&word.to_be_bytes());
        }
        push(out, &[0x1234]);

        let (year, month, day) = self.game_date;
        for word in [month, day, year] {
            out.extend_from_slice(&word.to_be_bytes());
        }
        out.extend_from_slice(&self.game_time.to_be_bytes());
        out.extend_from_slice(&self.elevation.to_be_bytes());
        out.extend_from_slice(&self.map_id.to_be_bytes());
        fixed(out, self.map.as_bytes(), 16);
        out.extend(std::iter::repeat_n(0, PREVIEW_AND_PADDING));
    }

    fn write_maps(&self, out: &mut Vec<u8>) {
        push(out, &[self.maps.len() as i32]);
        for map in &self.maps {
            out.extend_from_slice(map.as_bytes());
            out.push(0);
        }
        push(out, &[self.automap_size]);
    }

    fn write_player(&self, out: &mut Vec<u8>) {
        object_fields(out, PLAYER_PID);
        push(out, &[self.items.len() as i32, 10, 0]);
        push(out, &[0, 0, 0, 10, 0, -1, 0, -1, self.hp, 0, 0]);
        for &(quantity, pid) in &self.items {
            push(out, &[quantity]);
            object_fields(out, pid);
            push(out, &[0, 0, 0]); // empty inventory
            push(out, &[0]); // item flags
        }
        push(out, &[CENTER_TILE]);
        out.extend_from_slice(&self.h5_trailer);
    }

    fn write_proto(&self, out: &mut Vec<u8>) {
        push(out, &[0, 0]); // sneak working, flags
        push(out, &self.base_stats);
        push(out, &self.bonus_stats);
        push(out, &self.skills);
        push(out, &[0, self.proto_experience, 0]);
    }
}

fn object_fields(out: &mut Vec<u8>, pid: i32) {
    // id, tile, x, y, sx, sy, frame, rotation, fid, flags, elevation, pid,
    // cid, light distance, light intensity, outline, sid, script index
    push(
        out,
        &[1, 100, 0, 0, 0, 0, 0, 0, 0, 0, 0, pid, -1, 0, 0, 0, -1, -1],
    );
}

pub fn push(out: &mut Vec<u8>, values: &[i32]) {
    for value in values {
        out.extend_from_slice(&value.to_be_bytes());
    }
}

fn fixed(out: &mut Vec<u8>, bytes: &[u8], width: usize) {
    let len = bytes.len().min(width);
    out.extend_from_slice(&bytes[..len]);
    out.extend(std::iter::repeat_n(0, width - len));
}

pub fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    let word: [u8; 4] = bytes[offset..offset + 4]
        .try_into()
        .expect("four bytes");
    i32::from_be_bytes(word)
}

/// Offsets at which `a` and `b` differ; lengths must match.
pub fn differing_offsets(a: &[u8], b: &[u8]) -> Vec<usize> {
    assert_eq!(a.len(), b.len(), "buffers differ in length");
    a.iter()
        .zip(b)
        .enumerate()
        .filter(|(_, (x, y))| x != y)
        .map(|(offset, _)| offset)
        .collect()
}
