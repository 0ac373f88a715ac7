use foundation::ids::EntityId;
use scene::Entity;
use serde_json::{Value as Json, json};

/// Id used by the highlight predicate when nothing is selected.
///
/// Dataset ids are unsigned, so no entity can ever match it.
pub const NO_ENTITY_SENTINEL: i64 = -1;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Category,
    Group,
}

impl Field {
    /// Property name on the surface's feature data.
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Category => "species",
            Field::Group => "neighborhood_name",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
}

/// Declarative layer predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    Eq(Field, Value),
    All(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Predicate for the base layer: one equality per set filter.
    ///
    /// Returns `None` (no predicate, everything drawn) when neither filter is
    /// set, a bare equality for one filter and a conjunction for both.
    pub fn for_filters(category: Option<&str>, group: Option<&str>) -> Option<FilterExpr> {
        let mut terms = Vec::with_capacity(2);
        if let Some(c) = category {
            terms.push(FilterExpr::Eq(Field::Category, Value::Text(c.to_string())));
        }
        if let Some(g) = group {
            terms.push(FilterExpr::Eq(Field::Group, Value::Text(g.to_string())));
        }
        match terms.len() {
            0 => None,
            1 => terms.pop(),
            _ => Some(FilterExpr::All(terms)),
        }
    }

    /// Predicate for the highlight layer.
    pub fn highlight(id: Option<EntityId>) -> FilterExpr {
        let raw = match id {
            Some(id) => i64::try_from(id.get()).unwrap_or(i64::MAX),
            None => NO_ENTITY_SENTINEL,
        };
        FilterExpr::Eq(Field::Id, Value::Int(raw))
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            FilterExpr::All(terms) => terms.iter().all(|t| t.matches(entity)),
            FilterExpr::Eq(Field::Id, Value::Int(v)) => {
                i64::try_from(entity.id.get()).is_ok_and(|id| id == *v)
            }
            FilterExpr::Eq(Field::Category, Value::Text(v)) => entity.category == *v,
            FilterExpr::Eq(Field::Group, Value::Text(v)) => entity.group.as_deref() == Some(v),
            FilterExpr::Eq(_, _) => false,
        }
    }

    /// Map-engine expression syntax, e.g. `["==", ["get", "species"], "Oak"]`.
    pub fn to_json(&self) -> Json {
        match self {
            FilterExpr::Eq(field, value) => {
                let v = match value {
                    Value::Int(i) => json!(i),
                    Value::Text(s) => json!(s),
                };
                json!(["==", ["get", field.name()], v])
            }
            FilterExpr::All(terms) => {
                let mut out = vec![json!("all")];
                out.extend(terms.iter().map(FilterExpr::to_json));
                Json::Array(out)
            }
        }
    }
}
