//! Drawer record model and option merging.
//!
//! A [`DrawerRecord`] is one open overlay panel: a unique key plus a shared,
//! immutable [`DrawerOptions`] bag. Records are generic over a caller payload
//! `T` so applications can attach their own fields by composition without the
//! stack having to know about them.
//!
//! Option bags are stored behind `Rc` so that an updater returning the very same
//! bag can be recognised by pointer identity and skipped without a render.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Screen edge a drawer slides in from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    #[default]
    Right,
    Bottom,
    Left,
}

impl Placement {
    /// Lowercase name as used in attribute values and scripts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    /// Parses a lowercase placement name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "top" => Some(Self::Top),
            "right" => Some(Self::Right),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            _ => None,
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar value of a pass-through attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Predicate deciding whether a drawer may be dismissed.
pub type ClosePredicate<T> = Rc<dyn Fn(&DrawerRecord<T>) -> bool>;

/// Whether Escape or a backdrop click dismisses a drawer.
///
/// Either a literal answer or a predicate evaluated against the record at the
/// moment the input arrives. Both dismissal paths go through [`resolve`].
///
/// [`resolve`]: CloseBehavior::resolve
pub enum CloseBehavior<T = ()> {
    Fixed(bool),
    Dynamic(ClosePredicate<T>),
}

impl<T> CloseBehavior<T> {
    /// Wraps a predicate.
    pub fn dynamic<F>(predicate: F) -> Self
    where
        F: Fn(&DrawerRecord<T>) -> bool + 'static,
    {
        Self::Dynamic(Rc::new(predicate))
    }

    /// Evaluates the behaviour for `record`.
    ///
    /// Panics raised by a predicate propagate to the caller.
    pub fn resolve(&self, record: &DrawerRecord<T>) -> bool {
        match self {
            Self::Fixed(value) => *value,
            Self::Dynamic(predicate) => predicate(record),
        }
    }
}

impl<T> Clone for CloseBehavior<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(value) => Self::Fixed(*value),
            Self::Dynamic(predicate) => Self::Dynamic(Rc::clone(predicate)),
        }
    }
}

impl<T> fmt::Debug for CloseBehavior<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl<T> From<bool> for CloseBehavior<T> {
    fn from(value: bool) -> Self {
        Self::Fixed(value)
    }
}

/// Everything about a drawer except its key.
///
/// Every field is optional. The same shape doubles as the manager's global
/// defaults, which are merged underneath caller-supplied options on `open`.
pub struct DrawerOptions<T = ()> {
    /// Screen edge the drawer slides in from. Unset means [`Placement::Right`].
    pub placement: Option<Placement>,

    /// Whether Escape dismisses the drawer while it is on top. Unset means yes.
    pub close_on_escape_key: Option<CloseBehavior<T>>,

    /// Whether a click on the backdrop dismisses the drawer. Unset means yes.
    pub close_on_backdrop_click: Option<CloseBehavior<T>>,

    /// Accessible name of the panel.
    pub aria_label: Option<String>,

    /// Id of the element labelling the panel.
    pub aria_labelledby: Option<String>,

    /// Id of the element describing the panel.
    pub aria_describedby: Option<String>,

    /// Opaque attributes handed to the rendering layer. Keys should be namespaced.
    pub extra_attributes: Option<BTreeMap<String, AttrValue>>,
    /// Caller-defined payload.
    pub data: Option<T>,
}

impl<T> DrawerOptions<T> {
    /// Creates an option bag with every field unset.
    ///
    /// # Example
    ///
    /// ```rust
    /// use drawer_stack::domain::{DrawerOptions, Placement};
    ///
    /// let options: DrawerOptions = DrawerOptions::new()
    ///     .placement(Placement::Bottom)
    ///     .close_on_backdrop_click(false)
    ///     .aria_label("Cart");
    /// assert_eq!(options.placement, Some(Placement::Bottom));
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            placement: None,
            close_on_escape_key: None,
            close_on_backdrop_click: None,
            aria_label: None,
            aria_labelledby: None,
            aria_describedby: None,
            extra_attributes: None,
            data: None,
        }
    }

    /// Sets the screen edge.
    #[must_use]
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Sets the Escape behaviour.
    ///
    /// # Parameters
    ///
    /// * `behavior` - A literal `bool` or a [`CloseBehavior::dynamic`] predicate
    #[must_use]
    pub fn close_on_escape_key(mut self, behavior: impl Into<CloseBehavior<T>>) -> Self {
        self.close_on_escape_key = Some(behavior.into());
        self
    }

    /// Sets the backdrop-click behaviour. Accepts the same values as
    /// [`close_on_escape_key`](Self::close_on_escape_key).
    #[must_use]
    pub fn close_on_backdrop_click(mut self, behavior: impl Into<CloseBehavior<T>>) -> Self {
        self.close_on_backdrop_click = Some(behavior.into());
        self
    }

    /// Sets the accessible name.
    #[must_use]
    pub fn aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    /// Sets the id of the labelling element.
    #[must_use]
    pub fn aria_labelledby(mut self, id: impl Into<String>) -> Self {
        self.aria_labelledby = Some(id.into());
        self
    }

    /// Sets the id of the describing element.
    #[must_use]
    pub fn aria_describedby(mut self, id: impl Into<String>) -> Self {
        self.aria_describedby = Some(id.into());
        self
    }

    /// Adds one pass-through attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.extra_attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Attaches the caller payload.
    #[must_use]
    pub fn data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}

impl<T: Clone> DrawerOptions<T> {
    /// Returns these options with every unset field filled from `defaults`.
    ///
    /// Fields are merged one level deep: a caller-supplied attribute map
    /// replaces the default map rather than being combined with it.
    #[must_use]
    pub fn merged_over(&self, defaults: &Self) -> Self {
        Self {
            placement: self.placement.or(defaults.placement),
            close_on_escape_key: self
                .close_on_escape_key
                .clone()
                .or_else(|| defaults.close_on_escape_key.clone()),
            close_on_backdrop_click: self
                .close_on_backdrop_click
                .clone()
                .or_else(|| defaults.close_on_backdrop_click.clone()),
            aria_label: self.aria_label.clone().or_else(|| defaults.aria_label.clone()),
            aria_labelledby: self
                .aria_labelledby
                .clone()
                .or_else(|| defaults.aria_labelledby.clone()),
            aria_describedby: self
                .aria_describedby
                .clone()
                .or_else(|| defaults.aria_describedby.clone()),
            extra_attributes: self
                .extra_attributes
                .clone()
                .or_else(|| defaults.extra_attributes.clone()),
            data: self.data.clone().or_else(|| defaults.data.clone()),
        }
    }
}

impl<T> Default for DrawerOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DrawerOptions<T> {
    fn clone(&self) -> Self {
        Self {
            placement: self.placement,
            close_on_escape_key: self.close_on_escape_key.clone(),
            close_on_backdrop_click: self.close_on_backdrop_click.clone(),
            aria_label: self.aria_label.clone(),
            aria_labelledby: self.aria_labelledby.clone(),
            aria_describedby: self.aria_describedby.clone(),
            extra_attributes: self.extra_attributes.clone(),
            data: self.data.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DrawerOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawerOptions")
            .field("placement", &self.placement)
            .field("close_on_escape_key", &self.close_on_escape_key)
            .field("close_on_backdrop_click", &self.close_on_backdrop_click)
            .field("aria_label", &self.aria_label)
            .field("aria_labelledby", &self.aria_labelledby)
            .field("aria_describedby", &self.aria_describedby)
            .field("extra_attributes", &self.extra_attributes)
            .field("data", &self.data)
            .finish()
    }
}

/// One open drawer.
///
/// Cloning is cheap: the option bag is shared. `generation` is assigned by the
/// stack manager each time the key is opened and stays fixed across
/// `bring_to_top` and `update_options`.
pub struct DrawerRecord<T = ()> {
    key: String,
    options: Rc<DrawerOptions<T>>,
    generation: u64,
}

impl<T> DrawerRecord<T> {
    /// Creates a record with empty options.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_options(key, DrawerOptions::new())
    }

    /// Creates a record with the given options.
    #[must_use]
    pub fn with_options(key: impl Into<String>, options: DrawerOptions<T>) -> Self {
        Self::from_shared(key, Rc::new(options))
    }

    /// Creates a record around an already-shared option bag.
    #[must_use]
    pub fn from_shared(key: impl Into<String>, options: Rc<DrawerOptions<T>>) -> Self {
        Self {
            key: key.into(),
            options,
            generation: 0,
        }
    }

    /// Unique identifier of the drawer within its stack.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The shared option bag (everything but the key).
    #[must_use]
    pub const fn options(&self) -> &Rc<DrawerOptions<T>> {
        &self.options
    }

    /// Open generation stamped by the manager; `0` for records never opened.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn stamped(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub(crate) fn replace_options(&self, options: Rc<DrawerOptions<T>>) -> Self {
        Self {
            key: self.key.clone(),
            options,
            generation: self.generation,
        }
    }

    /// Effective placement, `Right` when unset.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.options.placement.unwrap_or_default()
    }

    /// Whether Escape dismisses this drawer; `true` when unset.
    pub fn closes_on_escape_key(&self) -> bool {
        self.options
            .close_on_escape_key
            .as_ref()
            .map_or(true, |behavior| behavior.resolve(self))
    }

    /// Whether a backdrop click dismisses this drawer; `true` when unset.
    pub fn closes_on_backdrop_click(&self) -> bool {
        self.options
            .close_on_backdrop_click
            .as_ref()
            .map_or(true, |behavior| behavior.resolve(self))
    }

    /// Caller payload, if one was attached.
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.options.data.as_ref()
    }
}

impl<T> Clone for DrawerRecord<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            options: Rc::clone(&self.options),
            generation: self.generation,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DrawerRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawerRecord")
            .field("key", &self.key)
            .field("generation", &self.generation)
            .field("options", &self.options)
            .finish()
    }
}

/// Serializable subset of [`DrawerOptions`].
///
/// Used for config-provided defaults and initial snapshots, where predicates
/// and caller payloads cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsSeed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_on_escape_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_on_backdrop_click: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_labelledby: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_describedby: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_attributes: Option<BTreeMap<String, AttrValue>>,
}

impl OptionsSeed {
    #[must_use]
    pub fn into_options<T>(self) -> DrawerOptions<T> {
        DrawerOptions {
            placement: self.placement,
            close_on_escape_key: self.close_on_escape_key.map(CloseBehavior::Fixed),
            close_on_backdrop_click: self.close_on_backdrop_click.map(CloseBehavior::Fixed),
            aria_label: self.aria_label,
            aria_labelledby: self.aria_labelledby,
            aria_describedby: self.aria_describedby,
            extra_attributes: self.extra_attributes,
            data: None,
        }
    }
}

/// Serializable drawer record, as found in an initial snapshot.
///
/// ```
/// use drawer_stack::domain::{DrawerSeed, Placement};
///
/// let seed: DrawerSeed = serde_json::from_str(r#"{"key":"cart","placement":"left"}"#).unwrap();
/// assert_eq!(seed.key, "cart");
/// assert_eq!(seed.options.placement, Some(Placement::Left));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawerSeed {
    pub key: String,
    #[serde(flatten)]
    pub options: OptionsSeed,
}

impl DrawerSeed {
    #[must_use]
    pub fn into_record<T>(self) -> DrawerRecord<T> {
        DrawerRecord::with_options(self.key, self.options.into_options())
    }
}
