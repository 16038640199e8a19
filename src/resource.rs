//! Resource kinds and the mapping from raw JSON into typed resources.
//!
//! Every resource kind carries a static transform table. Attributes named in
//! the table are converted (timestamps parsed, nested objects decoded into
//! their own kind); everything else is passed through unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;
use serde_json::Value;

use crate::error::{GetSatError, Result};

/// The named schemas exposed by the Get Satisfaction API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ResourceKind {
    Company,
    Product,
    Topic,
    Person,
    Reply,
    Comment,
    Tag,
    EmotiTag,
    Link,
}

/// How a single raw attribute is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Passthrough.
    Identity,
    /// Date-time string; null or absent becomes `None`.
    Timestamp,
    /// Nested object of the given kind; null or absent becomes `None`.
    Resource(ResourceKind),
    /// Array of objects of the given kind; null or absent becomes empty.
    ResourceList(ResourceKind),
}

const LINK: &[(&str, Transform)] = &[("created_at", Transform::Timestamp)];

const PERSON: &[(&str, Transform)] = &[("member_since", Transform::Timestamp)];

const PRODUCT: &[(&str, Transform)] = &[
    ("links", Transform::ResourceList(ResourceKind::Link)),
    ("created_at", Transform::Timestamp),
];

const TOPIC: &[(&str, Transform)] = &[
    ("created_at", Transform::Timestamp),
    ("last_active_at", Transform::Timestamp),
    ("author", Transform::Resource(ResourceKind::Person)),
    ("products", Transform::ResourceList(ResourceKind::Product)),
    ("emotitag", Transform::Resource(ResourceKind::EmotiTag)),
];

const AUTHORED: &[(&str, Transform)] = &[
    ("created_at", Transform::Timestamp),
    ("author", Transform::Resource(ResourceKind::Person)),
];

impl ResourceKind {
    /// Human-readable kind name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Product => "Product",
            Self::Topic => "Topic",
            Self::Person => "Person",
            Self::Reply => "Reply",
            Self::Comment => "Comment",
            Self::Tag => "Tag",
            Self::EmotiTag => "EmotiTag",
            Self::Link => "Link",
        }
    }

    /// The attribute transforms declared for this kind.
    pub fn transforms(self) -> &'static [(&'static str, Transform)] {
        match self {
            Self::Link => LINK,
            Self::Person => PERSON,
            Self::Product => PRODUCT,
            Self::Topic => TOPIC,
            Self::Reply | Self::Comment => AUTHORED,
            Self::Company | Self::Tag | Self::EmotiTag => &[],
        }
    }

    /// Transform for a named attribute, defaulting to identity.
    pub fn transform_for(self, attribute: &str) -> Transform {
        self.transforms()
            .iter()
            .find(|(name, _)| *name == attribute)
            .map_or(Transform::Identity, |(_, t)| *t)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A transformed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Attribute {
    Value(Value),
    Timestamp(Option<DateTime<FixedOffset>>),
    Resource(Option<Box<Resource>>),
    Resources(Vec<Resource>),
}

impl Transform {
    /// Apply the transform to a raw value. `None` means the key was absent.
    pub fn apply(self, attribute: &str, raw: Option<&Value>) -> Result<Attribute> {
        let raw = match raw {
            None | Some(Value::Null) => return Ok(self.placeholder()),
            Some(raw) => raw,
        };

        match self {
            Self::Identity => Ok(Attribute::Value(raw.clone())),
            Self::Timestamp => {
                let parsed = raw.as_str().and_then(parse_timestamp).ok_or_else(|| {
                    GetSatError::InvalidTimestamp {
                        attribute: attribute.to_string(),
                        value: raw.to_string(),
                    }
                })?;
                Ok(Attribute::Timestamp(Some(parsed)))
            }
            Self::Resource(kind) => Ok(Attribute::Resource(Some(Box::new(Resource::from_value(
                kind, raw,
            )?)))),
            Self::ResourceList(kind) => Ok(Attribute::Resources(decode_list(kind, raw)?)),
        }
    }

    /// The value used when the attribute is absent or null.
    pub fn placeholder(self) -> Attribute {
        match self {
            Self::Identity => Attribute::Value(Value::Null),
            Self::Timestamp => Attribute::Timestamp(None),
            Self::Resource(_) => Attribute::Resource(None),
            Self::ResourceList(_) => Attribute::Resources(Vec::new()),
        }
    }
}

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse the date-time formats the service emits.
///
/// Accepts RFC 3339, RFC 2822 and the `2013/05/15 15:56:42 +0000` form.
/// Values without an offset, including bare dates, are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    let zoned = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y/%m/%d %H:%M:%S %z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z"))
        .or_else(|_| DateTime::parse_from_rfc2822(raw));
    if let Ok(parsed) = zoned {
        return Some(parsed);
    }

    let naive = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    Some(FixedOffset::east_opt(0)?.from_utc_datetime(&naive))
}

/// An immutable, decoded API resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(skip)]
    kind: ResourceKind,
    #[serde(flatten)]
    attributes: BTreeMap<String, Attribute>,
}

impl Resource {
    /// Decode one JSON object into a resource of `kind`.
    pub fn from_value(kind: ResourceKind, raw: &Value) -> Result<Self> {
        let object = raw.as_object().ok_or_else(|| {
            GetSatError::UnexpectedShape(format!("expected a {kind} object, got {}", type_name(raw)))
        })?;

        let mut attributes = BTreeMap::new();
        for (name, value) in object {
            let attribute = kind.transform_for(name).apply(name, Some(value))?;
            attributes.insert(name.clone(), attribute);
        }
        for (name, transform) in kind.transforms() {
            if !attributes.contains_key(*name) {
                attributes.insert((*name).to_string(), transform.placeholder());
            }
        }

        Ok(Self { kind, attributes })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Iterate over attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// A raw string attribute.
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.attributes.get(name) {
            Some(Attribute::Value(Value::String(s))) => Some(s),
            _ => None,
        }
    }

    pub fn timestamp(&self, name: &str) -> Option<DateTime<FixedOffset>> {
        match self.attributes.get(name) {
            Some(Attribute::Timestamp(ts)) => *ts,
            _ => None,
        }
    }

    pub fn nested(&self, name: &str) -> Option<&Resource> {
        match self.attributes.get(name) {
            Some(Attribute::Resource(Some(r))) => Some(r),
            _ => None,
        }
    }

    /// A nested resource list; empty when the attribute is missing.
    pub fn list(&self, name: &str) -> &[Resource] {
        match self.attributes.get(name) {
            Some(Attribute::Resources(items)) => items,
            _ => &[],
        }
    }

    /// The resource identifier, whether the API sent it as a string or number.
    pub fn id(&self) -> Option<String> {
        match self.attributes.get("id") {
            Some(Attribute::Value(Value::String(s))) => Some(s.clone()),
            Some(Attribute::Value(Value::Number(n))) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Best display label: name, subject, or content.
    pub fn title(&self) -> Option<&str> {
        ["name", "subject", "content"]
            .into_iter()
            .find_map(|key| self.str(key))
    }
}

/// Result of decoding a payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Decoded {
    One(Resource),
    Many(Vec<Resource>),
}

impl Decoded {
    /// Flatten into a list of resources.
    pub fn into_vec(self) -> Vec<Resource> {
        match self {
            Self::One(r) => vec![r],
            Self::Many(items) => items,
        }
    }
}

/// Decode an object into one resource or an array into an ordered list.
pub fn decode(kind: ResourceKind, raw: &Value) -> Result<Decoded> {
    match raw {
        Value::Array(_) => Ok(Decoded::Many(decode_list(kind, raw)?)),
        _ => Ok(Decoded::One(Resource::from_value(kind, raw)?)),
    }
}

fn decode_list(kind: ResourceKind, raw: &Value) -> Result<Vec<Resource>> {
    let items = raw.as_array().ok_or_else(|| {
        GetSatError::UnexpectedShape(format!("expected a list of {kind}, got {}", type_name(raw)))
    })?;
    items
        .iter()
        .map(|item| Resource::from_value(kind, item))
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_parse_service_timestamp() {
        let expected = Utc.with_ymd_and_hms(2013, 5, 15, 15, 56, 42).unwrap();
        let parsed = parse_timestamp("2013/05/15 15:56:42 +0000").unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_rfc3339_timestamp() {
        let parsed = parse_timestamp("2013-05-15T15:56:42+02:00").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn test_parse_timestamp_without_offset_is_utc() {
        let expected = Utc.with_ymd_and_hms(2013, 5, 15, 15, 56, 42).unwrap();
        for raw in [
            "2013-05-15T15:56:42",
            "2013-05-15 15:56:42",
            "2013/05/15 15:56:42",
        ] {
            let parsed = parse_timestamp(raw).unwrap_or_else(|| panic!("{raw} should parse"));
            assert_eq!(parsed, expected, "{raw}");
            assert_eq!(parsed.offset().local_minus_utc(), 0, "{raw}");
        }
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let parsed = parse_timestamp("2013-05-15T15:56:42.250").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_date_only_is_midnight_utc() {
        let expected = Utc.with_ymd_and_hms(2013, 5, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2013-05-15").unwrap(), expected);
        assert_eq!(parse_timestamp("2013/05/15").unwrap(), expected);
    }

    #[test]
    fn test_offsetless_timestamps_do_not_fail_decode() {
        let decoded = decode(
            ResourceKind::Topic,
            &json!([
                {"subject": "ok"},
                {"created_at": "2013-05-15", "last_active_at": "2013-05-15T15:56:42"}
            ]),
        )
        .unwrap();

        let topics = decoded.into_vec();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].str("subject"), Some("ok"));
        assert!(topics[1].timestamp("created_at").is_some());
        assert!(topics[1].timestamp("last_active_at").is_some());
    }

    #[test]
    fn test_empty_object_fills_every_declared_attribute() {
        let topic = Resource::from_value(ResourceKind::Topic, &json!({})).unwrap();

        assert_eq!(topic.len(), ResourceKind::Topic.transforms().len());
        assert_eq!(topic.get("created_at"), Some(&Attribute::Timestamp(None)));
        assert_eq!(topic.get("last_active_at"), Some(&Attribute::Timestamp(None)));
        assert_eq!(topic.get("author"), Some(&Attribute::Resource(None)));
        assert_eq!(topic.get("emotitag"), Some(&Attribute::Resource(None)));
        assert_eq!(topic.get("products"), Some(&Attribute::Resources(vec![])));
    }

    #[test]
    fn test_untransformed_attributes_pass_through() {
        let tag = Resource::from_value(
            ResourceKind::Tag,
            &json!({"attr_name": "value", "count": 3}),
        )
        .unwrap();

        assert_eq!(tag.str("attr_name"), Some("value"));
        assert_eq!(tag.get("count"), Some(&Attribute::Value(json!(3))));
    }

    #[test]
    fn test_nested_transforms_applied() {
        let topic = Resource::from_value(
            ResourceKind::Topic,
            &json!({
                "subject": "Broken widget",
                "created_at": "2013/05/15 15:56:42 +0000",
                "author": {"name": "Ann", "member_since": "2012/01/01 00:00:00 +0000"},
                "products": [{"name": "Widget"}, {"name": "Gadget"}],
                "emotitag": null
            }),
        )
        .unwrap();

        let author = topic.nested("author").unwrap();
        assert_eq!(author.kind(), ResourceKind::Person);
        assert_eq!(author.str("name"), Some("Ann"));
        assert!(author.timestamp("member_since").is_some());

        let products = topic.list("products");
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].str("name"), Some("Widget"));
        assert_eq!(products[1].str("name"), Some("Gadget"));
        // Product's own table is applied to nested items
        assert_eq!(products[0].get("links"), Some(&Attribute::Resources(vec![])));

        assert!(topic.nested("emotitag").is_none());
        assert!(topic.timestamp("created_at").is_some());
        assert_eq!(topic.title(), Some("Broken widget"));
    }

    #[test]
    fn test_null_resource_list_is_empty() {
        let product =
            Resource::from_value(ResourceKind::Product, &json!({"links": null})).unwrap();
        assert_eq!(product.get("links"), Some(&Attribute::Resources(vec![])));
        assert!(product.list("links").is_empty());
    }

    #[test]
    fn test_null_timestamp_is_none() {
        let person =
            Resource::from_value(ResourceKind::Person, &json!({"member_since": null})).unwrap();
        assert_eq!(person.get("member_since"), Some(&Attribute::Timestamp(None)));
    }

    #[test]
    fn test_invalid_timestamp_is_an_error() {
        let err = Resource::from_value(ResourceKind::Person, &json!({"member_since": "soon"}))
            .unwrap_err();
        assert!(matches!(err, GetSatError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_decode_empty_array() {
        let decoded = decode(ResourceKind::Topic, &json!([])).unwrap();
        assert_eq!(decoded, Decoded::Many(vec![]));
    }

    #[test]
    fn test_decode_array_preserves_order() {
        let decoded = decode(
            ResourceKind::Person,
            &json!([{"name": "first"}, {"name": "second"}]),
        )
        .unwrap();

        let people = decoded.into_vec();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].str("name"), Some("first"));
        assert_eq!(people[1].str("name"), Some("second"));
    }

    #[test]
    fn test_decode_object_is_single() {
        let decoded = decode(ResourceKind::Company, &json!({"id": 42})).unwrap();
        match decoded {
            Decoded::One(company) => assert_eq!(company.id().as_deref(), Some("42")),
            Decoded::Many(_) => panic!("Expected a single resource"),
        }
    }

    #[test]
    fn test_decode_scalar_is_shape_error() {
        let err = decode(ResourceKind::Company, &json!("acme")).unwrap_err();
        assert!(matches!(err, GetSatError::UnexpectedShape(_)));
    }

    #[test]
    fn test_serializes_timestamps_as_rfc3339() {
        let link = Resource::from_value(
            ResourceKind::Link,
            &json!({"url": "https://example.com", "created_at": "2013/05/15 15:56:42 +0000"}),
        )
        .unwrap();

        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["url"], "https://example.com");
        let created = json["created_at"].as_str().unwrap();
        assert!(created.starts_with("2013-05-15T15:56:42"));
    }
}
