//! Little-endian NBT, the tagged binary tree format Bedrock uses for block
//! states and most other structured records.

use std::collections::HashMap;
use std::fmt;

use bedrock_common::{BedrockError, ByteCursor, Result};

/// Name given to compound entries stored with an empty name, so that they stay
/// addressable by key.
pub const PLACEHOLDER_NAME: &str = "compound";

/// Deepest compound/list nesting the decoder follows.
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagType {
    End,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    ByteArray,
    String,
    List,
    Compound,
    IntArray,
    LongArray,
}

impl TagType {
    pub fn id(self) -> u8 {
        match self {
            TagType::End => 0,
            TagType::Byte => 1,
            TagType::Short => 2,
            TagType::Int => 3,
            TagType::Long => 4,
            TagType::Float => 5,
            TagType::Double => 6,
            TagType::ByteArray => 7,
            TagType::String => 8,
            TagType::List => 9,
            TagType::Compound => 10,
            TagType::IntArray => 11,
            TagType::LongArray => 12,
        }
    }

    /// Smallest encoded payload size, used to reject lengths that cannot fit
    /// in the remaining input before allocating for them.
    fn min_payload_size(self) -> usize {
        match self {
            TagType::End => 0,
            TagType::Byte => 1,
            TagType::Short => 2,
            TagType::Int | TagType::Float => 4,
            TagType::Long | TagType::Double => 8,
            TagType::ByteArray | TagType::IntArray | TagType::LongArray => 4,
            TagType::String => 2,
            TagType::List => 5,
            TagType::Compound => 1,
        }
    }
}

impl TryFrom<u8> for TagType {
    type Error = BedrockError;

    fn try_from(id: u8) -> Result<Self> {
        match id {
            0 => Ok(TagType::End),
            1 => Ok(TagType::Byte),
            2 => Ok(TagType::Short),
            3 => Ok(TagType::Int),
            4 => Ok(TagType::Long),
            5 => Ok(TagType::Float),
            6 => Ok(TagType::Double),
            7 => Ok(TagType::ByteArray),
            8 => Ok(TagType::String),
            9 => Ok(TagType::List),
            10 => Ok(TagType::Compound),
            11 => Ok(TagType::IntArray),
            12 => Ok(TagType::LongArray),
            _ => Err(BedrockError::UnsupportedTagType(id)),
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagType::End => "TAG_End",
            TagType::Byte => "TAG_Byte",
            TagType::Short => "TAG_Short",
            TagType::Int => "TAG_Int",
            TagType::Long => "TAG_Long",
            TagType::Float => "TAG_Float",
            TagType::Double => "TAG_Double",
            TagType::ByteArray => "TAG_Byte_Array",
            TagType::String => "TAG_String",
            TagType::List => "TAG_List",
            TagType::Compound => "TAG_Compound",
            TagType::IntArray => "TAG_Int_Array",
            TagType::LongArray => "TAG_Long_Array",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    End,
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<Tag>),
    Compound(HashMap<String, Tag>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    /// Builds a compound from name/value pairs.
    pub fn compound<K, I>(entries: I) -> Tag
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Tag)>,
    {
        Tag::Compound(
            entries
                .into_iter()
                .map(|(name, tag)| (name.into(), tag))
                .collect(),
        )
    }

    pub fn tag_type(&self) -> TagType {
        match self {
            Tag::End => TagType::End,
            Tag::Byte(_) => TagType::Byte,
            Tag::Short(_) => TagType::Short,
            Tag::Int(_) => TagType::Int,
            Tag::Long(_) => TagType::Long,
            Tag::Float(_) => TagType::Float,
            Tag::Double(_) => TagType::Double,
            Tag::ByteArray(_) => TagType::ByteArray,
            Tag::String(_) => TagType::String,
            Tag::List(_) => TagType::List,
            Tag::Compound(_) => TagType::Compound,
            Tag::IntArray(_) => TagType::IntArray,
            Tag::LongArray(_) => TagType::LongArray,
        }
    }

    pub fn type_id(&self) -> u8 {
        self.tag_type().id()
    }

    /// Reads one named tag. An End tag carries no name and yields `("", End)`.
    pub fn read(cursor: &mut ByteCursor) -> Result<(String, Tag)> {
        Self::read_named(cursor, 0)
    }

    fn read_named(cursor: &mut ByteCursor, depth: usize) -> Result<(String, Tag)> {
        let type_id = cursor.read_u8()?;
        if type_id == 0 {
            return Ok((String::new(), Tag::End));
        }
        let tag_type = TagType::try_from(type_id)?;

        let name = cursor.read_length_prefixed_string()?.unwrap_or_default();
        let tag = Self::read_typed_payload(cursor, tag_type, depth)?;
        Ok((name, tag))
    }

    /// Reads the payload of a tag whose type id has already been consumed.
    pub fn read_payload(cursor: &mut ByteCursor, type_id: u8) -> Result<Tag> {
        Self::read_typed_payload(cursor, TagType::try_from(type_id)?, 0)
    }

    /// Reads compound entries until the closing End tag. The opening type id
    /// and name must already have been consumed.
    pub fn read_compound(cursor: &mut ByteCursor) -> Result<Tag> {
        Self::read_compound_at(cursor, 0)
    }

    fn read_compound_at(cursor: &mut ByteCursor, depth: usize) -> Result<Tag> {
        if depth >= MAX_DEPTH {
            return Err(BedrockError::invalid_data(format!(
                "Tags nested deeper than {} levels",
                MAX_DEPTH
            )));
        }

        let mut compound = HashMap::new();
        loop {
            let (name, tag) = Self::read_named(cursor, depth + 1)?;
            if let Tag::End = tag {
                break;
            }
            let name = if name.is_empty() {
                PLACEHOLDER_NAME.to_owned()
            } else {
                name
            };
            compound.insert(name, tag);
        }
        Ok(Tag::Compound(compound))
    }

    fn read_typed_payload(cursor: &mut ByteCursor, tag_type: TagType, depth: usize) -> Result<Tag> {
        match tag_type {
            TagType::End => Ok(Tag::End),
            TagType::Byte => Ok(Tag::Byte(cursor.read_u8()?)),
            TagType::Short => Ok(Tag::Short(cursor.read_i16()?)),
            TagType::Int => Ok(Tag::Int(cursor.read_i32()?)),
            TagType::Long => Ok(Tag::Long(cursor.read_i64()?)),
            TagType::Float => Ok(Tag::Float(cursor.read_f32()?)),
            TagType::Double => Ok(Tag::Double(cursor.read_f64()?)),
            TagType::ByteArray => {
                let length = read_length(cursor, TagType::Byte)?;
                let bytes = cursor.read_bytes(length)?;
                Ok(Tag::ByteArray(bytes.iter().map(|&b| b as i8).collect()))
            }
            TagType::String => Ok(Tag::String(
                cursor.read_length_prefixed_string()?.unwrap_or_default(),
            )),
            TagType::List => {
                if depth >= MAX_DEPTH {
                    return Err(BedrockError::invalid_data(format!(
                        "Tags nested deeper than {} levels",
                        MAX_DEPTH
                    )));
                }
                let element_type = TagType::try_from(cursor.read_u8()?)?;
                let length = read_length(cursor, element_type)?;
                if element_type == TagType::End && length > 0 {
                    return Err(BedrockError::invalid_data(format!(
                        "List of {} elements declares element type TAG_End",
                        length
                    )));
                }

                let mut list = Vec::with_capacity(length);
                for _ in 0..length {
                    list.push(Self::read_typed_payload(cursor, element_type, depth + 1)?);
                }
                Ok(Tag::List(list))
            }
            TagType::Compound => Self::read_compound_at(cursor, depth),
            TagType::IntArray => {
                let length = read_length(cursor, TagType::Int)?;
                let mut ints = Vec::with_capacity(length);
                for _ in 0..length {
                    ints.push(cursor.read_i32()?);
                }
                Ok(Tag::IntArray(ints))
            }
            TagType::LongArray => {
                let length = read_length(cursor, TagType::Long)?;
                let mut longs = Vec::with_capacity(length);
                for _ in 0..length {
                    longs.push(cursor.read_i64()?);
                }
                Ok(Tag::LongArray(longs))
            }
        }
    }

    pub fn write(&self, cursor: &mut ByteCursor, name: &str) -> Result<()> {
        cursor.write_u8(self.type_id());

        if !matches!(self, Tag::End) {
            cursor.write_length_prefixed_string(name)?;
        }

        self.write_payload(cursor)
    }

    pub fn write_payload(&self, cursor: &mut ByteCursor) -> Result<()> {
        match self {
            Tag::End => {}
            Tag::Byte(v) => cursor.write_u8(*v),
            Tag::Short(v) => cursor.write_i16(*v),
            Tag::Int(v) => cursor.write_i32(*v),
            Tag::Long(v) => cursor.write_i64(*v),
            Tag::Float(v) => cursor.write_f32(*v),
            Tag::Double(v) => cursor.write_f64(*v),
            Tag::ByteArray(v) => {
                write_length(cursor, v.len())?;
                for &b in v {
                    cursor.write_i8(b);
                }
            }
            Tag::String(v) => cursor.write_length_prefixed_string(v)?,
            Tag::List(v) => {
                // Empty lists are typed TAG_End
                let element_type = v.first().map_or(0, Tag::type_id);
                if v.iter().any(|tag| tag.type_id() != element_type) {
                    return Err(BedrockError::invalid_data("List elements differ in type"));
                }
                cursor.write_u8(element_type);
                write_length(cursor, v.len())?;
                for tag in v {
                    tag.write_payload(cursor)?;
                }
            }
            Tag::Compound(v) => {
                let mut names: Vec<&String> = v.keys().collect();
                names.sort();
                for name in names {
                    v[name].write(cursor, name)?;
                }
                Tag::End.write(cursor, "")?;
            }
            Tag::IntArray(v) => {
                write_length(cursor, v.len())?;
                for &i in v {
                    cursor.write_i32(i);
                }
            }
            Tag::LongArray(v) => {
                write_length(cursor, v.len())?;
                for &l in v {
                    cursor.write_i64(l);
                }
            }
        }
        Ok(())
    }

    /// Looks up a named entry when this tag is a compound.
    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.as_compound()?.get(name)
    }

    pub fn as_compound(&self) -> Option<&HashMap<String, Tag>> {
        match self {
            Tag::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Tag>> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Tag::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Tag::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Tag::Short(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Tag::Byte(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Tag::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Tag::Float(n) => Some(*n),
            _ => None,
        }
    }

    fn fmt_named(&self, f: &mut fmt::Formatter<'_>, name: &str, indent: usize) -> fmt::Result {
        write!(f, "{}{}(", "\t".repeat(indent), self.tag_type())?;
        if name.is_empty() {
            write!(f, "None")?;
        } else {
            write!(f, "'{}'", name)?;
        }

        match self {
            Tag::Compound(map) => {
                writeln!(f, "): {} entries {{", map.len())?;
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                for (child_name, child) in entries {
                    child.fmt_named(f, child_name, indent + 1)?;
                }
                writeln!(f, "{}}}", "\t".repeat(indent))
            }
            Tag::List(list) => {
                writeln!(f, "): {} entries [", list.len())?;
                for child in list {
                    child.fmt_named(f, "", indent + 1)?;
                }
                writeln!(f, "{}]", "\t".repeat(indent))
            }
            Tag::End => writeln!(f, ")"),
            Tag::Byte(v) => writeln!(f, "): {}", v),
            Tag::Short(v) => writeln!(f, "): {}", v),
            Tag::Int(v) => writeln!(f, "): {}", v),
            Tag::Long(v) => writeln!(f, "): {}", v),
            Tag::Float(v) => writeln!(f, "): {}", v),
            Tag::Double(v) => writeln!(f, "): {}", v),
            Tag::String(v) => writeln!(f, "): '{}'", v),
            Tag::ByteArray(v) => writeln!(f, "): {:?}", v),
            Tag::IntArray(v) => writeln!(f, "): {:?}", v),
            Tag::LongArray(v) => writeln!(f, "): {:?}", v),
        }
    }
}

/// Indented, one-tag-per-line rendering; compound entries are sorted by name.
impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_named(f, "", 0)
    }
}

// i32 element count, checked against what the input can still hold.
fn read_length(cursor: &mut ByteCursor, element_type: TagType) -> Result<usize> {
    let length = cursor.read_i32()?;
    let length = usize::try_from(length)
        .map_err(|_| BedrockError::invalid_data(format!("Negative length: {}", length)))?;

    let requested = length.saturating_mul(element_type.min_payload_size());
    if requested > cursor.remaining() {
        return Err(BedrockError::OutOfBounds {
            position: cursor.position(),
            requested,
            len: cursor.len(),
        });
    }
    Ok(length)
}

fn write_length(cursor: &mut ByteCursor, length: usize) -> Result<()> {
    let length = i32::try_from(length)
        .map_err(|_| BedrockError::invalid_data(format!("Length {} exceeds i32", length)))?;
    cursor.write_i32(length);
    Ok(())
}
