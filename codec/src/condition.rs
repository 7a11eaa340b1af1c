//! Conditional-presence resolution.
//!
//! An `include_if` annotation names a boolean or unsigned integer field
//! elsewhere in the record tree — absolute paths root at the top-level
//! record, relative paths at the immediate parent — and compares it against
//! a comparand. Both walkers consult the verdict before touching the
//! annotated field, so an excluded field contributes no bits on encode and
//! consumes none on decode.

use crate::{
    annotation::{Comparison, IncludeIf},
    record::{Record, Reflect, ValueRef},
    Error,
};

/// Decides whether the annotated field is present.
///
/// `root` is the top-level value under encode or decode; `parent` is the
/// record directly containing the annotated field.
pub(crate) fn included(
    condition: &IncludeIf,
    root: &dyn Reflect,
    parent: &dyn Record,
) -> Result<bool, Error> {
    let base: &dyn Record = if condition.relative {
        parent
    } else {
        match root.view() {
            ValueRef::Record(record) => record,
            _ => return Err(Error::NotARecord("root".into())),
        }
    };

    match resolve(base, &condition.path)? {
        ValueRef::Bool(actual) => {
            let comparand = parse_bool(condition.rhs.unwrap_or("true"))?;
            Ok(verdict(condition.op, comparand == actual))
        }
        ValueRef::U8(actual) => compare_uint(u64::from(actual), condition),
        ValueRef::U16(actual) => compare_uint(u64::from(actual), condition),
        ValueRef::U32(actual) => compare_uint(u64::from(actual), condition),
        ValueRef::U64(actual) => compare_uint(actual, condition),
        _ => Err(Error::UnsupportedConditionType(condition.path.join("."))),
    }
}

/// Walks the path segment by segment from `base`.
fn resolve<'a>(base: &'a dyn Record, path: &[&str]) -> Result<ValueRef<'a>, Error> {
    let mut current = ValueRef::Record(base);
    for (depth, segment) in path.iter().enumerate() {
        let record = match current {
            ValueRef::Record(record) => record,
            _ => return Err(Error::NotARecord(path[depth - 1].to_string())),
        };
        let index = record
            .fields()
            .iter()
            .position(|field| field.name == *segment)
            .ok_or_else(|| Error::PathNotFound((*segment).to_string()))?;
        current = record.field(index);
    }
    Ok(current)
}

fn compare_uint(actual: u64, condition: &IncludeIf) -> Result<bool, Error> {
    let raw = condition.rhs.unwrap_or("0");
    let comparand: u64 = raw
        .parse()
        .map_err(|_| Error::BadAnnotation(format!("invalid integer comparand '{raw}'")))?;
    Ok(verdict(condition.op, comparand == actual))
}

fn parse_bool(raw: &str) -> Result<bool, Error> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::BadAnnotation(format!(
            "invalid boolean comparand '{other}'"
        ))),
    }
}

fn verdict(op: Comparison, equal: bool) -> bool {
    match op {
        Comparison::Equal => equal,
        Comparison::NotEqual => !equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        annotation::{Annotations, Descriptor},
        record::{FieldDef, ValueMut},
    };

    // Hand-rolled capability impls; what `#[derive(Record)]` would generate.
    #[derive(Default)]
    struct Inner {
        enabled: bool,
        kind: u16,
    }

    impl Record for Inner {
        fn fields(&self) -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[
                FieldDef { name: "enabled", annotations: Annotations { endian: None, field_width: None, slice_prefix: None, string_type: None, include_if: None } },
                FieldDef { name: "kind", annotations: Annotations { endian: None, field_width: None, slice_prefix: None, string_type: None, include_if: None } },
            ];
            FIELDS
        }

        fn field(&self, index: usize) -> ValueRef<'_> {
            match index {
                0 => self.enabled.view(),
                1 => self.kind.view(),
                _ => panic!("field index out of range"),
            }
        }

        fn field_mut(&mut self, index: usize) -> ValueMut<'_> {
            match index {
                0 => self.enabled.view_mut(),
                1 => self.kind.view_mut(),
                _ => panic!("field index out of range"),
            }
        }
    }

    impl Reflect for Inner {
        fn view(&self) -> ValueRef<'_> {
            ValueRef::Record(self)
        }

        fn view_mut(&mut self) -> ValueMut<'_> {
            ValueMut::Record(self)
        }
    }

    #[derive(Default)]
    struct Outer {
        ready: bool,
        inner: Inner,
        label: String,
    }

    impl Record for Outer {
        fn fields(&self) -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[
                FieldDef { name: "ready", annotations: Annotations { endian: None, field_width: None, slice_prefix: None, string_type: None, include_if: None } },
                FieldDef { name: "inner", annotations: Annotations { endian: None, field_width: None, slice_prefix: None, string_type: None, include_if: None } },
                FieldDef { name: "label", annotations: Annotations { endian: None, field_width: None, slice_prefix: None, string_type: None, include_if: None } },
            ];
            FIELDS
        }

        fn field(&self, index: usize) -> ValueRef<'_> {
            match index {
                0 => self.ready.view(),
                1 => self.inner.view(),
                2 => self.label.view(),
                _ => panic!("field index out of range"),
            }
        }

        fn field_mut(&mut self, index: usize) -> ValueMut<'_> {
            match index {
                0 => self.ready.view_mut(),
                1 => self.inner.view_mut(),
                2 => self.label.view_mut(),
                _ => panic!("field index out of range"),
            }
        }
    }

    impl Reflect for Outer {
        fn view(&self) -> ValueRef<'_> {
            ValueRef::Record(self)
        }

        fn view_mut(&mut self) -> ValueMut<'_> {
            ValueMut::Record(self)
        }
    }

    fn include_if(raw: &'static str) -> IncludeIf {
        let annotations = Annotations {
            include_if: Some(raw),
            ..Annotations::default()
        };
        Descriptor::parse(&annotations).unwrap().include_if.unwrap()
    }

    #[test]
    fn test_bool_default_comparand() {
        let mut outer = Outer::default();
        let condition = include_if(".ready");
        assert!(!included(&condition, &outer, &outer.inner).unwrap());

        outer.ready = true;
        assert!(included(&condition, &outer, &outer.inner).unwrap());
    }

    #[test]
    fn test_bool_explicit_comparand() {
        let outer = Outer::default();
        assert!(included(&include_if(".ready==false"), &outer, &outer.inner).unwrap());
        assert!(!included(&include_if(".ready==true"), &outer, &outer.inner).unwrap());
        assert!(included(&include_if(".ready!=true"), &outer, &outer.inner).unwrap());
    }

    #[test]
    fn test_relative_base() {
        let outer = Outer {
            ready: true,
            inner: Inner {
                enabled: false,
                kind: 0,
            },
            label: String::new(),
        };

        // Relative paths resolve against the parent, not the root.
        let condition = include_if("enabled");
        assert!(!included(&condition, &outer, &outer.inner).unwrap());
    }

    #[test]
    fn test_uint_comparands() {
        let outer = Outer {
            inner: Inner {
                enabled: false,
                kind: 32,
            },
            ..Outer::default()
        };

        assert!(included(&include_if(".inner.kind==32"), &outer, &outer).unwrap());
        assert!(!included(&include_if(".inner.kind==16"), &outer, &outer).unwrap());
        assert!(included(&include_if(".inner.kind!=16"), &outer, &outer).unwrap());
        // No comparand means "include when zero".
        assert!(!included(&include_if(".inner.kind"), &outer, &outer).unwrap());
    }

    #[test]
    fn test_path_errors() {
        let outer = Outer::default();

        assert_eq!(
            included(&include_if(".missing"), &outer, &outer),
            Err(Error::PathNotFound("missing".into()))
        );
        assert_eq!(
            included(&include_if(".ready.deeper"), &outer, &outer),
            Err(Error::NotARecord("ready".into()))
        );
        assert_eq!(
            included(&include_if(".label"), &outer, &outer),
            Err(Error::UnsupportedConditionType("label".into()))
        );
    }

    #[test]
    fn test_bad_comparands() {
        let outer = Outer::default();

        assert!(matches!(
            included(&include_if(".ready==maybe"), &outer, &outer),
            Err(Error::BadAnnotation(_))
        ));
        assert!(matches!(
            included(&include_if(".inner.kind==many"), &outer, &outer),
            Err(Error::BadAnnotation(_))
        ));
    }
}
