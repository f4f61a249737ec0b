use crate::error::{EditRejection, EncodeError, FormatError};
use crate::layout::SectionId;
use crate::reader::BigEndianReader;
use crate::tables::MAX_INVENTORY_LINES;

// Object type extracted from PID: (pid >> 24) & 0x0F
pub const OBJ_TYPE_ITEM: i32 = 0;
pub const OBJ_TYPE_CRITTER: i32 = 1;
pub const OBJ_TYPE_MISC: i32 = 5;

const EXIT_GRID_PIDS: std::ops::RangeInclusive<i32> = 0x500_0010..=0x500_0017;
const MAX_NESTING_DEPTH: usize = 16;
const PLAYER_SECTION: SectionId = SectionId::Handler(5);

pub fn obj_type_from_pid(pid: i32) -> i32 {
    (pid >> 24) & 0x0F
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameObject {
    pub id: i32,
    pub tile: i32,
    pub x: i32,
    pub y: i32,
    pub sx: i32,
    pub sy: i32,
    pub frame: i32,
    pub rotation: i32,
    pub fid: i32,
    pub flags: i32,
    pub elevation: i32,
    pub pid: i32,
    pub cid: i32,
    pub light_distance: i32,
    pub light_intensity: i32,
    pub outline: i32,
    pub sid: i32,
    pub script_index: i32,
    /// Length as stored; `-1` marks an inventory that was never allocated.
    pub inventory_length: i32,
    pub inventory_capacity: i32,
    pub inventory_placeholder: i32,
    pub object_data: ObjectData,
    pub inventory: Vec<InventoryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectData {
    Critter(CritterObjectData),
    Item(ItemObjectData),
    Scenery { flags: i32 },
    Misc(ExitGridData),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CritterObjectData {
    pub field_0: i32,
    pub damage_last_turn: i32,
    pub maneuver: i32,
    pub ap: i32,
    pub results: i32,
    pub ai_packet: i32,
    pub team: i32,
    pub who_hit_me_cid: i32,
    pub hp: i32,
    pub radiation: i32,
    pub poison: i32,
}

/// Item subtype is not recorded in the save, so the 0, 4 or 8 bytes after
/// the flags (armor/container/drug, ammo/misc/key, weapon) are kept raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemObjectData {
    pub flags: i32,
    pub extra_bytes: u8,
    pub extra_data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitGridData {
    pub map: i32,
    pub tile: i32,
    pub elevation: i32,
    pub rotation: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    pub quantity: i32,
    pub object: GameObject,
}

impl GameObject {
    pub fn parse(r: &mut BigEndianReader<'_>) -> Result<Self, FormatError> {
        Self::parse_nested(r, 0)
    }

    fn parse_nested(r: &mut BigEndianReader<'_>, depth: usize) -> Result<Self, FormatError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(FormatError::section(
                PLAYER_SECTION,
                format!(
                    "inventory nesting deeper than {MAX_NESTING_DEPTH} at offset {}",
                    r.position()
                ),
            ));
        }

        let [
            id,
            tile,
            x,
            y,
            sx,
            sy,
            frame,
            rotation,
            fid,
            flags,
            elevation,
            pid,
            cid,
            light_distance,
            light_intensity,
            outline,
            sid,
            script_index,
        ] = r.read_i32_array::<18>()?;

        let [inventory_length, inventory_capacity, inventory_placeholder] =
            r.read_i32_array::<3>()?;

        if !(-1..=MAX_INVENTORY_LINES as i32).contains(&inventory_length) {
            return Err(FormatError::section(
                PLAYER_SECTION,
                format!(
                    "invalid inventory length {inventory_length} for object pid=0x{pid:08x} at offset {}",
                    r.position()
                ),
            ));
        }

        let object_data = match obj_type_from_pid(pid) {
            OBJ_TYPE_CRITTER => ObjectData::Critter(parse_critter_data(r)?),
            OBJ_TYPE_ITEM => ObjectData::Item(parse_item_data(r)?),
            OBJ_TYPE_MISC if EXIT_GRID_PIDS.contains(&pid) => {
                let [map, tile, elevation, rotation] = r.read_i32_array::<4>()?;
                ObjectData::Misc(ExitGridData {
                    map,
                    tile,
                    elevation,
                    rotation,
                })
            }
            OBJ_TYPE_MISC => ObjectData::Other,
            // Scenery, walls and the rest all write at least a flags word.
            _ => ObjectData::Scenery {
                flags: r.read_i32()?,
            },
        };

        let line_count = inventory_length.max(0) as usize;
        let mut inventory = Vec::with_capacity(line_count.min(r.remaining() / 4));
        for _ in 0..line_count {
            let quantity = r.read_i32()?;
            let object = GameObject::parse_nested(r, depth + 1)?;
            inventory.push(InventoryItem { quantity, object });
        }

        Ok(Self {
            id,
            tile,
            x,
            y,
            sx,
            sy,
            frame,
            rotation,
            fid,
            flags,
            elevation,
            pid,
            cid,
            light_distance,
            light_intensity,
            outline,
            sid,
            script_index,
            inventory_length,
            inventory_capacity,
            inventory_placeholder,
            object_data,
            inventory,
        })
    }

    pub fn emit_to_vec(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        if self.inventory.len() > MAX_INVENTORY_LINES {
            return Err(EncodeError::InventoryTooLarge {
                count: self.inventory.len(),
                max: MAX_INVENTORY_LINES,
            });
        }

        for value in [
            self.id,
            self.tile,
            self.x,
            self.y,
            self.sx,
            self.sy,
            self.frame,
            self.rotation,
            self.fid,
            self.flags,
            self.elevation,
            self.pid,
            self.cid,
            self.light_distance,
            self.light_intensity,
            self.outline,
            self.sid,
            self.script_index,
        ] {
            push_i32(out, value);
        }

        let line_count = self.inventory.len() as i32;
        let (length, capacity) = if self.inventory_length.max(0) == line_count {
            (self.inventory_length, self.inventory_capacity)
        } else {
            (line_count, self.inventory_capacity.max(line_count))
        };
        push_i32(out, length);
        push_i32(out, capacity);
        push_i32(out, self.inventory_placeholder);

        match &self.object_data {
            ObjectData::Critter(data) => {
                for value in [
                    data.field_0,
                    data.damage_last_turn,
                    data.maneuver,
                    data.ap,
                    data.results,
                    data.ai_packet,
                    data.team,
                    data.who_hit_me_cid,
                    data.hp,
                    data.radiation,
                    data.poison,
                ] {
                    push_i32(out, value);
                }
            }
            ObjectData::Item(data) => {
                if data.extra_data.len() != data.extra_bytes as usize {
                    return Err(EncodeError::ItemData {
                        declared: data.extra_bytes,
                        stored: data.extra_data.len(),
                    });
                }
                push_i32(out, data.flags);
                out.extend_from_slice(&data.extra_data);
            }
            ObjectData::Scenery { flags } => push_i32(out, *flags),
            ObjectData::Misc(grid) => {
                for value in [grid.map, grid.tile, grid.elevation, grid.rotation] {
                    push_i32(out, value);
                }
            }
            ObjectData::Other => {}
        }

        for item in &self.inventory {
            push_i32(out, item.quantity);
            item.object.emit_to_vec(out)?;
        }

        Ok(())
    }

    pub fn emit_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        self.emit_to_vec(&mut out)?;
        Ok(out)
    }

    pub fn is_critter(&self) -> bool {
        matches!(self.object_data, ObjectData::Critter(_))
    }

    pub fn hit_points(&self) -> Option<i32> {
        match &self.object_data {
            ObjectData::Critter(data) => Some(data.hp),
            _ => None,
        }
    }

    pub fn set_hit_points(&mut self, hp: i32) -> Result<(), EditRejection> {
        match &mut self.object_data {
            ObjectData::Critter(data) => {
                data.hp = hp;
                Ok(())
            }
            _ => Err(EditRejection::Unavailable("player hit points")),
        }
    }

    /// Items anywhere in this object's inventory tree whose trailing bytes
    /// had to be guessed.
    pub fn probed_item_count(&self) -> usize {
        self.inventory
            .iter()
            .map(|item| {
                usize::from(matches!(item.object.object_data, ObjectData::Item(_)))
                    + item.object.probed_item_count()
            })
            .sum()
    }

    pub fn quantity_of(&self, pid: i32) -> i64 {
        self.inventory
            .iter()
            .filter(|item| item.object.pid == pid)
            .map(|item| i64::from(item.quantity))
            .sum()
    }

    /// Sets the first line with `pid` to `quantity` and drops any other lines
    /// with the same pid. Zero removes them all.
    pub fn set_item_quantity(&mut self, pid: i32, quantity: i32) -> Result<(), EditRejection> {
        if !self.inventory.iter().any(|item| item.object.pid == pid) {
            return Err(EditRejection::MissingItem { pid });
        }
        self.collapse_lines(pid, quantity)
    }

    pub fn add_item_quantity(&mut self, pid: i32, delta: i32) -> Result<(), EditRejection> {
        let item = self
            .inventory
            .iter_mut()
            .find(|item| item.object.pid == pid)
            .ok_or(EditRejection::MissingItem { pid })?;
        item.quantity =
            item.quantity
                .checked_add(delta)
                .ok_or(EditRejection::QuantityOverflow {
                    pid,
                    current: item.quantity,
                    delta,
                })?;
        Ok(())
    }

    /// `None` removes every line; `Some(n)` takes `n` off the total and
    /// clamps at zero.
    pub fn remove_item_quantity(
        &mut self,
        pid: i32,
        quantity: Option<i32>,
    ) -> Result<(), EditRejection> {
        if !self.inventory.iter().any(|item| item.object.pid == pid) {
            return Err(EditRejection::MissingItem { pid });
        }
        let remaining = match quantity {
            None => 0,
            Some(n) => {
                let left = (self.quantity_of(pid) - i64::from(n)).max(0);
                i32::try_from(left).unwrap_or(i32::MAX)
            }
        };
        self.collapse_lines(pid, remaining)
    }

    /// Keeps `quantity` on the first line with `pid` and drops the others.
    /// Dropped duplicates must not hold items of their own; a zero quantity
    /// removes every line with their contents.
    fn collapse_lines(&mut self, pid: i32, quantity: i32) -> Result<(), EditRejection> {
        if quantity > 0
            && self
                .inventory
                .iter()
                .filter(|item| item.object.pid == pid)
                .skip(1)
                .any(|item| !item.object.inventory.is_empty())
        {
            return Err(EditRejection::NestedInventory { pid });
        }

        let mut assigned = false;
        self.inventory.retain_mut(|item| {
            if item.object.pid != pid {
                return true;
            }
            if assigned || quantity <= 0 {
                return false;
            }
            item.quantity = quantity;
            assigned = true;
            true
        });
        Ok(())
    }
}

fn push_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn parse_critter_data(r: &mut BigEndianReader<'_>) -> Result<CritterObjectData, FormatError> {
    let [
        field_0,
        damage_last_turn,
        maneuver,
        ap,
        results,
        ai_packet,
        team,
        who_hit_me_cid,
        hp,
        radiation,
        poison,
    ] = r.read_i32_array::<11>()?;
    Ok(CritterObjectData {
        field_0,
        damage_last_turn,
        maneuver,
        ap,
        results,
        ai_packet,
        team,
        who_hit_me_cid,
        hp,
        radiation,
        poison,
    })
}

/// Tries 0, 4 and 8 trailing bytes and keeps whichever makes the following
/// bytes look most like the next inventory record. Ties go to the smaller
/// size.
fn parse_item_data(r: &mut BigEndianReader<'_>) -> Result<ItemObjectData, FormatError> {
    let flags = r.read_i32()?;
    let after_flags = r.position();

    let mut best_extra = 0u8;
    let mut best_score = -1;
    for extra in [0u8, 4, 8] {
        let mut probe = r.clone();
        if probe.seek_to(after_flags + usize::from(extra)).is_err() {
            continue;
        }
        let score = score_next_record(&probe);
        if score > best_score {
            best_score = score;
            best_extra = extra;
        }
    }

    let extra_data = r.read_bytes(usize::from(best_extra))?.to_vec();
    Ok(ItemObjectData {
        flags,
        extra_bytes: best_extra,
        extra_data,
    })
}

/// 3 = plausible quantity, object type and inventory length; 2 = quantity
/// and type; 1 = quantity only, or end of data; 0 = nothing fits.
fn score_next_record(r: &BigEndianReader<'_>) -> i32 {
    let start = r.position();
    let mut peek = r.clone();

    let Ok(next_qty) = peek.read_i32() else {
        return 1;
    };
    if next_qty <= 0 || next_qty > 10_000 {
        return 0;
    }

    // pid is the 12th base field, inventory length follows the 18 base fields
    let pid_pos = start + 4 + 44;
    let inv_len_pos = start + 4 + 72;

    let next_pid = peek.seek_to(pid_pos).and_then(|_| peek.read_i32());
    let Ok(next_pid) = next_pid else {
        return 1;
    };
    if !(0..=5).contains(&obj_type_from_pid(next_pid)) {
        return 1;
    }

    match peek.seek_to(inv_len_pos).and_then(|_| peek.read_i32()) {
        Ok(len) if (0..MAX_INVENTORY_LINES as i32).contains(&len) => 3,
        _ => 2,
    }
}
