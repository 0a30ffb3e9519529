//! Native column type mapping
//!
//! Every recognized native type name resolves once to a [`NativeType`], and every
//! `NativeType` has exactly one [`TypeTemplate`]: the logical type, the storage options
//! its category defines, and the constraint it contributes. Column-specific rules
//! (boolean narrowing, 64-bit transforms, enum values, presence) are applied on top of
//! the template by [`map_column_type`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::ColumnRow;
use crate::util::contains_ci;

/// Toggles that change how integer columns are mapped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Map `tinyint(1)` columns to boolean through a transformer
    pub generate_tinyint_transformer: bool,
    /// Map `bigint` columns to integer through a transformer instead of a numeric string
    pub generate_bigint_transformer: bool,
}

/// Portable, vendor-independent column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Boolean,
    Integer,
    /// Number carried as a string to avoid precision loss
    DecimalString,
    Float,
    Date,
    DateTime,
    Time,
    Text,
    Binary,
    Json,
    Enum,
    Set,
    Unsupported,
}

impl LogicalType {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalType::Boolean => "boolean",
            LogicalType::Integer => "integer",
            LogicalType::DecimalString => "decimal-string",
            LogicalType::Float => "float",
            LogicalType::Date => "date",
            LogicalType::DateTime => "datetime",
            LogicalType::Time => "time",
            LogicalType::Text => "text",
            LogicalType::Binary => "binary",
            LogicalType::Json => "json",
            LogicalType::Enum => "enum",
            LogicalType::Set => "set",
            LogicalType::Unsupported => "unsupported",
        }
    }
}

/// Storage options; each is only set for native types whose category defines it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageOptions {
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub length: Option<u64>,
    pub width: Option<u32>,
}

/// Value conversion applied between the native and logical representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transformer {
    /// `tinyint(1)` <-> boolean
    TinyIntToBoolean,
    /// `bigint` string <-> integer; values beyond 53 bits lose precision
    BigIntToNumber,
}

impl Transformer {
    pub fn as_str(self) -> &'static str {
        match self {
            Transformer::TinyIntToBoolean => "TinyIntToBoolean",
            Transformer::BigIntToNumber => "BigIntToNumber",
        }
    }
}

/// Validation checks the generated model should enforce
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationConstraint {
    MaxLength(u64),
    IsNumber,
    IsNumberString,
    /// Value (or, with `each`, every element) must be one of `values`
    IsIn {
        values: Vec<String>,
        each: bool,
    },
    /// A value must be present
    Required,
    /// Absence is tolerated alongside the other checks
    Optional,
}

/// Normalized column default
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefaultValue {
    CurrentTimestamp,
    Literal(String),
    Array(Vec<String>),
}

/// Closed set of recognized native column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    Bit,
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal,
    Date,
    DateTime,
    Timestamp,
    Time,
    Year,
    Char,
    VarChar,
    TinyText,
    Text,
    MediumText,
    LongText,
    Binary,
    VarBinary,
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,
    Enum,
    Set,
    Json,
    Geometry,
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

/// Catalog spellings, including aliases, of every native type
const NATIVE_TYPE_NAMES: &[(&str, NativeType)] = &[
    ("bit", NativeType::Bit),
    ("tinyint", NativeType::TinyInt),
    ("smallint", NativeType::SmallInt),
    ("mediumint", NativeType::MediumInt),
    ("int", NativeType::Int),
    ("integer", NativeType::Int),
    ("bigint", NativeType::BigInt),
    ("float", NativeType::Float),
    ("double", NativeType::Double),
    ("double precision", NativeType::Double),
    ("real", NativeType::Double),
    ("decimal", NativeType::Decimal),
    ("dec", NativeType::Decimal),
    ("numeric", NativeType::Decimal),
    ("fixed", NativeType::Decimal),
    ("date", NativeType::Date),
    ("datetime", NativeType::DateTime),
    ("timestamp", NativeType::Timestamp),
    ("time", NativeType::Time),
    ("year", NativeType::Year),
    ("char", NativeType::Char),
    ("varchar", NativeType::VarChar),
    ("tinytext", NativeType::TinyText),
    ("text", NativeType::Text),
    ("mediumtext", NativeType::MediumText),
    ("longtext", NativeType::LongText),
    ("binary", NativeType::Binary),
    ("varbinary", NativeType::VarBinary),
    ("tinyblob", NativeType::TinyBlob),
    ("blob", NativeType::Blob),
    ("mediumblob", NativeType::MediumBlob),
    ("longblob", NativeType::LongBlob),
    ("enum", NativeType::Enum),
    ("set", NativeType::Set),
    ("json", NativeType::Json),
    ("geometry", NativeType::Geometry),
    ("point", NativeType::Point),
    ("linestring", NativeType::LineString),
    ("polygon", NativeType::Polygon),
    ("multipoint", NativeType::MultiPoint),
    ("multilinestring", NativeType::MultiLineString),
    ("multipolygon", NativeType::MultiPolygon),
    ("geometrycollection", NativeType::GeometryCollection),
    ("geomcollection", NativeType::GeometryCollection),
];

/// Storage options a native type category defines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageCategory {
    pub precision: bool,
    pub scale: bool,
    pub length: bool,
    pub width: bool,
}

impl StorageCategory {
    const NONE: Self = Self {
        precision: false,
        scale: false,
        length: false,
        width: false,
    };
    const WIDTH: Self = Self {
        width: true,
        ..Self::NONE
    };
    const LENGTH: Self = Self {
        length: true,
        ..Self::NONE
    };
    const NUMERIC: Self = Self {
        precision: true,
        scale: true,
        ..Self::NONE
    };
    const TEMPORAL: Self = Self {
        precision: true,
        ..Self::NONE
    };
}

/// Constraint a native type contributes before presence rules are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintTemplate {
    MaxLength,
    IsNumber,
    IsNumberString,
    IsIn,
    IsInEach,
}

/// Mapping record for one native type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTemplate {
    pub logical_type: LogicalType,
    pub storage: StorageCategory,
    pub constraint: Option<ConstraintTemplate>,
}

impl TypeTemplate {
    const fn new(
        logical_type: LogicalType,
        storage: StorageCategory,
        constraint: Option<ConstraintTemplate>,
    ) -> Self {
        Self {
            logical_type,
            storage,
            constraint,
        }
    }
}

impl NativeType {
    /// Resolve a catalog type name (case-insensitive, aliases included)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        NATIVE_TYPE_NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, t)| *t)
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            NativeType::Bit => "bit",
            NativeType::TinyInt => "tinyint",
            NativeType::SmallInt => "smallint",
            NativeType::MediumInt => "mediumint",
            NativeType::Int => "int",
            NativeType::BigInt => "bigint",
            NativeType::Float => "float",
            NativeType::Double => "double",
            NativeType::Decimal => "decimal",
            NativeType::Date => "date",
            NativeType::DateTime => "datetime",
            NativeType::Timestamp => "timestamp",
            NativeType::Time => "time",
            NativeType::Year => "year",
            NativeType::Char => "char",
            NativeType::VarChar => "varchar",
            NativeType::TinyText => "tinytext",
            NativeType::Text => "text",
            NativeType::MediumText => "mediumtext",
            NativeType::LongText => "longtext",
            NativeType::Binary => "binary",
            NativeType::VarBinary => "varbinary",
            NativeType::TinyBlob => "tinyblob",
            NativeType::Blob => "blob",
            NativeType::MediumBlob => "mediumblob",
            NativeType::LongBlob => "longblob",
            NativeType::Enum => "enum",
            NativeType::Set => "set",
            NativeType::Json => "json",
            NativeType::Geometry => "geometry",
            NativeType::Point => "point",
            NativeType::LineString => "linestring",
            NativeType::Polygon => "polygon",
            NativeType::MultiPoint => "multipoint",
            NativeType::MultiLineString => "multilinestring",
            NativeType::MultiPolygon => "multipolygon",
            NativeType::GeometryCollection => "geometrycollection",
        }
    }

    pub fn template(self) -> TypeTemplate {
        use ConstraintTemplate as C;
        use LogicalType as L;
        use StorageCategory as S;

        match self {
            NativeType::Bit => TypeTemplate::new(L::Integer, S::NONE, None),
            NativeType::TinyInt
            | NativeType::SmallInt
            | NativeType::MediumInt
            | NativeType::Int => TypeTemplate::new(L::Integer, S::WIDTH, Some(C::IsNumber)),
            NativeType::BigInt => {
                TypeTemplate::new(L::DecimalString, S::WIDTH, Some(C::IsNumberString))
            }
            NativeType::Float | NativeType::Double => TypeTemplate::new(L::Float, S::NUMERIC, None),
            NativeType::Decimal => TypeTemplate::new(L::DecimalString, S::NUMERIC, None),
            NativeType::Date => TypeTemplate::new(L::Date, S::NONE, None),
            NativeType::DateTime | NativeType::Timestamp => {
                TypeTemplate::new(L::DateTime, S::TEMPORAL, None)
            }
            NativeType::Time => TypeTemplate::new(L::Time, S::TEMPORAL, None),
            NativeType::Year => TypeTemplate::new(L::Integer, S::NONE, None),
            NativeType::Char | NativeType::VarChar => {
                TypeTemplate::new(L::Text, S::LENGTH, Some(C::MaxLength))
            }
            NativeType::TinyText
            | NativeType::Text
            | NativeType::MediumText
            | NativeType::LongText => TypeTemplate::new(L::Text, S::NONE, None),
            NativeType::Binary | NativeType::VarBinary => {
                TypeTemplate::new(L::Binary, S::LENGTH, None)
            }
            NativeType::TinyBlob
            | NativeType::Blob
            | NativeType::MediumBlob
            | NativeType::LongBlob => TypeTemplate::new(L::Binary, S::NONE, None),
            NativeType::Enum => TypeTemplate::new(L::Enum, S::NONE, Some(C::IsIn)),
            NativeType::Set => TypeTemplate::new(L::Set, S::NONE, Some(C::IsInEach)),
            NativeType::Json => TypeTemplate::new(L::Json, S::NONE, None),
            NativeType::Geometry
            | NativeType::Point
            | NativeType::LineString
            | NativeType::Polygon
            | NativeType::MultiPoint
            | NativeType::MultiLineString
            | NativeType::MultiPolygon
            | NativeType::GeometryCollection => TypeTemplate::new(L::Text, S::NONE, None),
        }
    }
}

/// Result of mapping one column
#[derive(Debug, Clone, PartialEq)]
pub struct MappedType {
    /// `None` when the catalog type name is not recognized
    pub native: Option<NativeType>,
    pub logical_type: LogicalType,
    pub storage: StorageOptions,
    pub transformer: Option<Transformer>,
    pub constraints: Vec<ValidationConstraint>,
    pub enum_values: Vec<String>,
    pub unsigned: bool,
    pub default: Option<DefaultValue>,
}

static DISPLAY_WIDTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\w+\s*\(\s*(\d+)\s*\)").expect("Invalid display width regex"));

static CURRENT_TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(current_timestamp|localtimestamp|localtime|now)\s*(\(\s*\d*\s*\))?$")
        .expect("Invalid current timestamp regex")
});

/// Map a catalog column to its logical type, storage options and constraints.
///
/// Pure: the same row and options always produce the same result. Unrecognized
/// native types map to [`LogicalType::Unsupported`]; reporting them is the caller's job.
pub fn map_column_type(row: &ColumnRow, options: &GenerationOptions) -> MappedType {
    map_column(row, options, row.referenced_table_name.is_some())
}

/// [`map_column_type`] for a column whose foreign-key status is already known, for
/// example from the catalog's foreign-key rows
pub(crate) fn map_column(
    row: &ColumnRow,
    options: &GenerationOptions,
    is_foreign_key: bool,
) -> MappedType {
    let native = NativeType::from_name(&row.data_type);
    let default = normalize_default(row.column_default.as_deref(), native);
    let unsigned = contains_ci(&row.column_type, " unsigned");
    let width = display_width(&row.column_type);

    let Some(native) = native else {
        let mut constraints = Vec::new();
        push_presence_constraint(&mut constraints, row, default.is_some(), is_foreign_key);
        return MappedType {
            native: None,
            logical_type: LogicalType::Unsupported,
            storage: StorageOptions::default(),
            transformer: None,
            constraints,
            enum_values: Vec::new(),
            unsigned,
            default,
        };
    };

    let template = native.template();
    let mut logical_type = template.logical_type;
    let mut constraint = template.constraint;
    let mut transformer = None;

    match native {
        NativeType::Bit if width == Some(1) => {
            logical_type = LogicalType::Boolean;
        }
        // Identity values are assigned by the server; never transform them
        NativeType::TinyInt
            if width == Some(1) && options.generate_tinyint_transformer && !row.is_identity =>
        {
            logical_type = LogicalType::Boolean;
            constraint = None;
            transformer = Some(Transformer::TinyIntToBoolean);
        }
        NativeType::BigInt if options.generate_bigint_transformer && !row.is_identity => {
            logical_type = LogicalType::Integer;
            constraint = Some(ConstraintTemplate::IsNumber);
            transformer = Some(Transformer::BigIntToNumber);
        }
        _ => {}
    }

    let enum_values = match native {
        NativeType::Enum | NativeType::Set => parse_enum_values(&row.column_type),
        _ => Vec::new(),
    };

    let category = template.storage;
    let storage = StorageOptions {
        precision: row.numeric_precision.filter(|_| category.precision),
        scale: row.numeric_scale.filter(|_| category.scale),
        length: row
            .character_maximum_length
            .filter(|len| category.length && *len > 0),
        width: if !category.width {
            None
        } else if logical_type == LogicalType::Boolean {
            Some(1)
        } else {
            width
        },
    };

    let mut constraints = Vec::new();
    match constraint {
        Some(ConstraintTemplate::MaxLength) => {
            if let Some(len) = row.character_maximum_length.filter(|len| *len > 0) {
                constraints.push(ValidationConstraint::MaxLength(len));
            }
        }
        Some(ConstraintTemplate::IsNumber) => constraints.push(ValidationConstraint::IsNumber),
        Some(ConstraintTemplate::IsNumberString) => {
            constraints.push(ValidationConstraint::IsNumberString)
        }
        Some(ConstraintTemplate::IsIn) => constraints.push(ValidationConstraint::IsIn {
            values: enum_values.clone(),
            each: false,
        }),
        Some(ConstraintTemplate::IsInEach) => constraints.push(ValidationConstraint::IsIn {
            values: enum_values.clone(),
            each: true,
        }),
        None => {}
    }
    push_presence_constraint(&mut constraints, row, default.is_some(), is_foreign_key);

    MappedType {
        native: Some(native),
        logical_type,
        storage,
        transformer,
        constraints,
        enum_values,
        unsigned,
        default,
    }
}

/// `Required` when nothing can fill the column in, otherwise `Optional` if any
/// other check exists. Foreign keys may be populated after the row is created.
fn push_presence_constraint(
    constraints: &mut Vec<ValidationConstraint>,
    row: &ColumnRow,
    has_default: bool,
    is_foreign_key: bool,
) {
    let may_be_absent = row.is_nullable || has_default || row.is_identity || is_foreign_key;

    if !may_be_absent {
        constraints.push(ValidationConstraint::Required);
    } else if !constraints.is_empty() {
        constraints.push(ValidationConstraint::Optional);
    }
}

/// Display width of a signature such as `int(11) unsigned`
fn display_width(signature: &str) -> Option<u32> {
    DISPLAY_WIDTH_RE
        .captures(signature)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Values of an `enum('a','b')` or `set('a','b')` signature. `''` inside a value is
/// an escaped quote.
pub fn parse_enum_values(signature: &str) -> Vec<String> {
    let (Some(open), Some(close)) = (signature.find('('), signature.rfind(')')) else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }

    let mut values = Vec::new();
    let mut chars = signature[open + 1..close].chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\'' {
            continue;
        }
        let mut value = String::new();
        loop {
            match chars.next() {
                Some('\'') if chars.peek() == Some(&'\'') => {
                    chars.next();
                    value.push('\'');
                }
                Some('\'') | None => break,
                Some(other) => value.push(other),
            }
        }
        values.push(value);
    }
    values
}

/// Normalize a raw catalog default.
///
/// Blank and `NULL` defaults vanish; any spelling of the current timestamp becomes
/// [`DefaultValue::CurrentTimestamp`]; quoted literals are unquoted; set columns get
/// their members as an array.
pub fn normalize_default(raw: Option<&str>, native: Option<NativeType>) -> Option<DefaultValue> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("NULL") {
        return None;
    }
    if CURRENT_TIMESTAMP_RE.is_match(trimmed) {
        return Some(DefaultValue::CurrentTimestamp);
    }

    let literal = if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        trimmed[1..trimmed.len() - 1].replace("''", "'")
    } else {
        raw.to_string()
    };

    if native == Some(NativeType::Set) {
        return Some(DefaultValue::Array(
            literal
                .split(',')
                .filter(|member| !member.is_empty())
                .map(str::to_string)
                .collect(),
        ));
    }

    Some(DefaultValue::Literal(literal))
}
