/// How a related entity type is reached from this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// One target row whose `target_field` equals this entity's `local_field`.
    HasOne,
    /// Every target row whose `target_field` equals this entity's `local_field`.
    HasMany,
}

/// Relation descriptor interpreted by the resolver.
///
/// Unset field names fall back to identifiers at resolution time: the
/// local side to this entity's identifier field, the target side to the
/// target's identifier field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub kind: RelationKind,
    pub target: String,
    pub local_field: Option<String>,
    pub target_field: Option<String>,
}

impl Relation {
    pub fn has_one(target: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::HasOne,
            target: target.into(),
            local_field: None,
            target_field: None,
        }
    }

    pub fn has_many(target: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::HasMany,
            ..Self::has_one(target)
        }
    }

    pub fn fields(mut self, local_field: Option<&str>, target_field: Option<&str>) -> Self {
        self.local_field = local_field.map(str::to_string);
        self.target_field = target_field.map(str::to_string);
        self
    }
}

/// A relation as written in an entity declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationDecl {
    HasOne(Relation),
    HasMany(Relation),
    /// Has-one on the declaring side plus a reciprocal has-many on the target.
    BelongsTo(Relation),
}
