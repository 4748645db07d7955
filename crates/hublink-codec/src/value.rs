//! Native value model.

use hublink_schema::{ElemKind, FieldKind, LookupError, Registry, ScalarWidth, TypeIndex};

/// A decoded or to-be-encoded native value.
///
/// Values form an owned tree shaped by the schema: scalars and strings at
/// the leaves, arrays as element lists, aggregates as positional field
/// lists matching their type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// 8-bit scalar.
    U8(u8),
    /// 16-bit scalar.
    U16(u16),
    /// 32-bit scalar.
    U32(u32),
    /// 64-bit scalar.
    U64(u64),
    /// String bytes.
    Str(String),
    /// Array elements in wire order.
    Array(Vec<Value>),
    /// Aggregate fields in descriptor order.
    Struct(Vec<Value>),
}

impl Value {
    /// Short name of the value's shape, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
        }
    }

    /// Zero value for a scalar width.
    pub fn zero(width: ScalarWidth) -> Value {
        match width {
            ScalarWidth::One => Value::U8(0),
            ScalarWidth::Two => Value::U16(0),
            ScalarWidth::Four => Value::U32(0),
            ScalarWidth::Eight => Value::U64(0),
        }
    }

    /// Default value for a field: zeroed scalars, empty strings and
    /// variable arrays, fully populated fixed arrays and aggregates.
    pub fn default_for(registry: &Registry, kind: &FieldKind) -> Result<Value, LookupError> {
        Ok(match *kind {
            FieldKind::Scalar(width) => Value::zero(width),
            FieldKind::Str { .. } => Value::Str(String::new()),
            FieldKind::FixedArray { elem, count } => {
                let elem_value = Value::default_elem(registry, elem)?;
                Value::Array(vec![elem_value; count as usize])
            }
            FieldKind::VarArray { .. } => Value::Array(Vec::new()),
            FieldKind::Aggregate(index) => Value::default_struct(registry, index)?,
        })
    }

    fn default_elem(registry: &Registry, elem: ElemKind) -> Result<Value, LookupError> {
        match elem {
            ElemKind::Scalar(width) => Ok(Value::zero(width)),
            ElemKind::Aggregate(index) => Value::default_struct(registry, index),
        }
    }

    fn default_struct(registry: &Registry, index: TypeIndex) -> Result<Value, LookupError> {
        let desc = registry.type_at(index)?;
        let mut fields = Vec::with_capacity(desc.fields.len());
        for f in desc.fields {
            fields.push(Value::default_for(registry, &f.kind)?);
        }
        Ok(Value::Struct(fields))
    }
}

/// A message body as native values: one slot per descriptor field, `None`
/// where an optional field is absent.
///
/// Slots follow the message descriptor's field order. Absence is the only
/// presence signal; there are no validity flags to keep in sync.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageValue {
    fields: Vec<Option<Value>>,
}

impl MessageValue {
    /// A body with `field_count` empty slots.
    pub fn new(field_count: usize) -> Self {
        MessageValue {
            fields: vec![None; field_count],
        }
    }

    /// A body from prefilled slots.
    pub fn from_fields(fields: Vec<Option<Value>>) -> Self {
        MessageValue { fields }
    }

    /// Set the value in a slot.
    pub fn set(&mut self, slot: usize, value: Value) {
        self.fields[slot] = Some(value);
    }

    /// Clear a slot, marking the field absent.
    pub fn clear(&mut self, slot: usize) {
        self.fields[slot] = None;
    }

    /// Value in a slot, or `None` if the field is absent.
    pub fn get(&self, slot: usize) -> Option<&Value> {
        self.fields.get(slot).and_then(Option::as_ref)
    }

    /// Whether a slot holds a value.
    pub fn is_present(&self, slot: usize) -> bool {
        self.get(slot).is_some()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the body has no slots.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All slots in descriptor order.
    pub fn fields(&self) -> &[Option<Value>] {
        &self.fields
    }
}
