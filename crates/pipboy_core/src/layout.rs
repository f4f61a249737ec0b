use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Sections are numbered after the game's save handlers; everything past the
/// last decoded handler is kept as an opaque tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionId {
    Header,
    Handler(u8),
    Tail,
}

impl SectionId {
    /// Parses `header`, `tail` or `handler:N`.
    pub fn parse(value: &str) -> Option<Self> {
        let lowered = value.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "header" => Some(Self::Header),
            "tail" => Some(Self::Tail),
            other => other
                .strip_prefix("handler:")
                .and_then(|n| n.parse::<u8>().ok())
                .map(Self::Handler),
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header"),
            Self::Handler(n) => write!(f, "handler:{n}"),
            Self::Tail => f.write_str("tail"),
        }
    }
}

impl Serialize for SectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionLayout {
    pub id: SectionId,
    pub range: ByteRange,
    /// 1.0 for exact fixed-size reads, lower when the boundary came from a
    /// heuristic search.
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileLayout {
    pub file_len: usize,
    pub sections: Vec<SectionLayout>,
}

impl FileLayout {
    pub fn position(&self, id: SectionId) -> Option<usize> {
        self.sections.iter().position(|section| section.id == id)
    }

    pub fn get(&self, id: SectionId) -> Option<&SectionLayout> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn min_confidence(&self) -> f32 {
        self.sections
            .iter()
            .map(|section| section.confidence)
            .fold(1.0, f32::min)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.sections.is_empty() {
            return Err(LayoutError::Empty);
        }

        let mut expected = 0usize;
        for section in &self.sections {
            if section.range.start != expected {
                return Err(LayoutError::Discontiguous {
                    section: section.id,
                    expected,
                    actual: section.range.start,
                });
            }
            if section.range.end < section.range.start {
                return Err(LayoutError::Inverted {
                    section: section.id,
                    start: section.range.start,
                    end: section.range.end,
                });
            }
            expected = section.range.end;
        }

        if expected != self.file_len {
            return Err(LayoutError::Coverage {
                ended: expected,
                file_len: self.file_len,
            });
        }

        Ok(())
    }

    /// Resizes one section and shifts every later section by the difference.
    pub(crate) fn resize(&mut self, index: usize, new_len: usize) -> Result<(), LayoutError> {
        let Some(section) = self.sections.get_mut(index) else {
            return Err(LayoutError::Empty);
        };
        let old_len = section.range.len();
        section.range.end = section.range.start + new_len;

        if new_len >= old_len {
            let delta = new_len - old_len;
            for later in self.sections.iter_mut().skip(index + 1) {
                later.range.start += delta;
                later.range.end += delta;
            }
            self.file_len += delta;
        } else {
            let delta = old_len - new_len;
            for later in self.sections.iter_mut().skip(index + 1) {
                later.range.start -= delta;
                later.range.end -= delta;
            }
            self.file_len -= delta;
        }

        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteRange, FileLayout, SectionId, SectionLayout};
    use crate::error::LayoutError;

    fn section(id: SectionId, start: usize, end: usize) -> SectionLayout {
        SectionLayout {
            id,
            range: ByteRange { start, end },
            confidence: 1.0,
        }
    }

    #[test]
    fn section_id_round_trips_through_text() {
        for id in [SectionId::Header, SectionId::Handler(13), SectionId::Tail] {
            assert_eq!(SectionId::parse(&id.to_string()), Some(id));
        }
        assert_eq!(SectionId::parse("handler:x"), None);
    }

    #[test]
    fn validate_reports_gap() {
        let layout = FileLayout {
            file_len: 20,
            sections: vec![
                section(SectionId::Header, 0, 8),
                section(SectionId::Handler(1), 10, 20),
            ],
        };
        assert_eq!(
            layout.validate(),
            Err(LayoutError::Discontiguous {
                section: SectionId::Handler(1),
                expected: 8,
                actual: 10,
            })
        );
    }

    #[test]
    fn resize_shifts_later_sections() {
        let mut layout = FileLayout {
            file_len: 30,
            sections: vec![
                section(SectionId::Header, 0, 10),
                section(SectionId::Handler(5), 10, 20),
                section(SectionId::Tail, 20, 30),
            ],
        };

        layout.resize(1, 4).expect("shrink should keep layout valid");
        assert_eq!(layout.file_len, 24);
        assert_eq!(layout.sections[2].range, ByteRange { start: 14, end: 24 });

        layout.resize(1, 16).expect("grow should keep layout valid");
        assert_eq!(layout.file_len, 36);
        assert_eq!(layout.sections[2].range, ByteRange { start: 26, end: 36 });
    }
}
