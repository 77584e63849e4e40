//! The schema value model: one variant per JSON shape, plus `Nullable`.

// ── Schema ───────────────────────────────────────────────────────────────────

/// Recursive description of a tool parameter.
///
/// Schemas are plain values: construction is the only mutation, and every
/// fluent method consumes and returns the builder.  There are no cycles;
/// children are owned directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
    /// Signals that the emitted type may also be `null`.
    Nullable(Box<Schema>),
}

impl Schema {
    /// Wrap this schema so the emitted type set also admits `null`.
    ///
    /// Wrapping an already-nullable schema is a no-op: the type set can only
    /// carry one `null` entry.
    pub fn nullable(self) -> Schema {
        match self {
            Schema::Nullable(_) => self,
            other => Schema::Nullable(Box::new(other)),
        }
    }

    /// The human-readable description carried by the underlying variant.
    pub fn description(&self) -> &str {
        match self {
            Schema::String(s) => &s.description,
            Schema::Number(s) => &s.description,
            Schema::Boolean(s) => &s.description,
            Schema::Array(s) => &s.description,
            Schema::Object(s) => &s.description,
            Schema::Nullable(inner) => inner.description(),
        }
    }

    /// Borrow the object variant, looking through `Nullable` wrappers.
    /// Returns `None` for non-object schemas.
    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            Schema::Object(o) => Some(o),
            Schema::Nullable(inner) => inner.as_object(),
            _ => None,
        }
    }
}

// ── String ───────────────────────────────────────────────────────────────────

/// Schema for a JSON string, with optional enum / pattern / length constraints.
///
/// Constraints are advertised to the model through the emitted schema; the
/// extractor only checks the value's type.
#[derive(Debug, Clone, PartialEq)]
pub struct StringSchema {
    pub description: String,
    pub enum_values: Option<Vec<String>>,
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

impl StringSchema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            enum_values: None,
            pattern: None,
            min_length: None,
            max_length: None,
        }
    }

    /// Restrict the value to a fixed, ordered set of alternatives.
    pub fn enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn min_length(mut self, n: u64) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: u64) -> Self {
        self.max_length = Some(n);
        self
    }
}

impl From<StringSchema> for Schema {
    fn from(s: StringSchema) -> Schema {
        Schema::String(s)
    }
}

// ── Number ───────────────────────────────────────────────────────────────────

/// Schema for a JSON number.  `integer` selects the `"integer"` JSON-Schema
/// type; bounds and `multiple_of` are emitted only when present.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberSchema {
    pub description: String,
    pub integer: bool,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,
}

impl NumberSchema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            integer: false,
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            multiple_of: None,
        }
    }

    /// Integer flavor of the numeric schema.
    pub fn integer(description: impl Into<String>) -> Self {
        Self {
            integer: true,
            ..Self::new(description)
        }
    }

    pub fn minimum(mut self, v: f64) -> Self {
        self.minimum = Some(v);
        self
    }

    pub fn maximum(mut self, v: f64) -> Self {
        self.maximum = Some(v);
        self
    }

    pub fn exclusive_minimum(mut self, v: f64) -> Self {
        self.exclusive_minimum = Some(v);
        self
    }

    pub fn exclusive_maximum(mut self, v: f64) -> Self {
        self.exclusive_maximum = Some(v);
        self
    }

    /// Multiple-of constraint.  Must be positive to be meaningful; zero and
    /// negative values are ignored.
    pub fn multiple_of(mut self, v: f64) -> Self {
        if v > 0.0 {
            self.multiple_of = Some(v);
        }
        self
    }
}

impl From<NumberSchema> for Schema {
    fn from(s: NumberSchema) -> Schema {
        Schema::Number(s)
    }
}

// ── Boolean ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanSchema {
    pub description: String,
}

impl BooleanSchema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl From<BooleanSchema> for Schema {
    fn from(s: BooleanSchema) -> Schema {
        Schema::Boolean(s)
    }
}

// ── Array ────────────────────────────────────────────────────────────────────

/// Schema for a homogeneous JSON array.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub description: String,
    pub items: Box<Schema>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
}

impl ArraySchema {
    pub fn new(description: impl Into<String>, items: impl Into<Schema>) -> Self {
        Self {
            description: description.into(),
            items: Box::new(items.into()),
            min_items: None,
            max_items: None,
            unique_items: false,
        }
    }

    pub fn min_items(mut self, n: u64) -> Self {
        self.min_items = Some(n);
        self
    }

    pub fn max_items(mut self, n: u64) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn unique_items(mut self) -> Self {
        self.unique_items = true;
        self
    }
}

impl From<ArraySchema> for Schema {
    fn from(s: ArraySchema) -> Schema {
        Schema::Array(s)
    }
}

// ── Object ───────────────────────────────────────────────────────────────────

/// A named property inside an [`ObjectSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySchema {
    pub name: String,
    pub schema: Schema,
    pub required: bool,
}

/// Schema for a JSON object with an ordered property list.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    pub description: String,
    pub properties: Vec<PropertySchema>,
    pub additional_properties: bool,
}

impl ObjectSchema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            properties: Vec::new(),
            additional_properties: false,
        }
    }

    /// Add a property.  Property names are unique within an object: adding a
    /// name that already exists replaces the earlier entry in place, keeping
    /// its original position in the declaration order.
    pub fn property(mut self, name: impl Into<String>, schema: impl Into<Schema>, required: bool) -> Self {
        let name = name.into();
        let entry = PropertySchema {
            name: name.clone(),
            schema: schema.into(),
            required,
        };
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = entry,
            None => self.properties.push(entry),
        }
        self
    }

    /// Shorthand for a required property.
    pub fn required(self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.property(name, schema, true)
    }

    /// Shorthand for an optional property.
    pub fn optional(self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.property(name, schema, false)
    }

    pub fn additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = allowed;
        self
    }
}

impl From<ObjectSchema> for Schema {
    fn from(s: ObjectSchema) -> Schema {
        Schema::Object(s)
    }
}

// ── tests ────────────────────────────────────────────────────────────────────
