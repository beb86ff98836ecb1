//! Integration tests for structural duplication: identity, cycles, sharing,
//! containers and binary data

mod common;
use common::{array, deep_equal, init_tracing, num, object};
use deepcopy::runtime::TypedArrayKind;
use deepcopy::{duplicate, ErrorKind, Property, PropertyFlags, Symbol, Value, WellKnownSymbol};
use pretty_assertions::assert_eq;

mod primitives {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primitives_are_identical() {
        init_tracing();
        let sym = Symbol::new(Some("id"));
        for v in [
            Value::Undefined,
            Value::Null,
            Value::Boolean(false),
            num(-0.5),
            Value::String("text".into()),
            Value::Symbol(sym),
            Value::BigInt(12345678901234567890u64.into()),
        ] {
            assert!(duplicate(&v).unwrap().strict_equals(&v), "{:?}", v);
        }
    }

    #[test]
    fn test_nan_is_returned() {
        let dup = duplicate(&num(f64::NAN)).unwrap();
        assert!(matches!(dup, Value::Number(n) if n.is_nan()));
    }
}

mod graphs {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nested_object() {
        init_tracing();
        let b = object(&[("c", num(2.0))]);
        let src = object(&[("a", num(1.0)), ("b", b.clone())]);

        let dup = duplicate(&src).unwrap();
        assert!(!dup.ptr_eq(&src));
        assert!(deep_equal(&dup, &src));
        assert!(!dup.get("b").ptr_eq(&b));
    }

    #[test]
    fn test_nested_array() {
        let inner = array(&[num(2.0), num(3.0)]);
        let d = object(&[("d", num(4.0))]);
        let src = array(&[num(1.0), inner.clone(), d.clone()]);

        let dup = duplicate(&src).unwrap();
        assert!(deep_equal(&dup, &src));
        assert!(!dup.get("1").ptr_eq(&inner));
        assert!(!dup.get("2").ptr_eq(&d));
    }

    #[test]
    fn test_self_cycle() {
        let obj = object(&[("name", Value::from("loop"))]);
        obj.set("self", obj.clone());

        let dup = duplicate(&obj).unwrap();
        assert!(dup.get("self").ptr_eq(&dup));
        assert!(!dup.get("self").ptr_eq(&obj));

        let again = duplicate(&obj).unwrap();
        assert!(!again.ptr_eq(&dup));
    }

    #[test]
    fn test_indirect_cycle_through_map_and_array() {
        let parent = Value::new_object();
        let children = Value::new_array(vec![]);
        let child = object(&[("parent", parent.clone())]);
        children.array_push(child);
        parent.set("children", children);
        let index = Value::new_map(vec![(Value::from("root"), parent.clone())]);
        parent.set("index", index);

        let dup = duplicate(&parent).unwrap();
        let dup_child = dup.get("children").get("0");
        assert!(dup_child.get("parent").ptr_eq(&dup));
        assert!(dup.get("index").map_get(&Value::from("root")).unwrap().ptr_eq(&dup));
        assert!(deep_equal(&dup, &parent));
    }

    #[test]
    fn test_shared_reference_stays_shared() {
        let shared = Value::new_object();
        let container = object(&[("x", shared.clone()), ("y", shared.clone())]);

        let dup = duplicate(&container).unwrap();
        assert!(dup.get("x").ptr_eq(&dup.get("y")));
        assert!(!dup.get("x").ptr_eq(&shared));
    }

    #[test]
    fn test_structurally_equal_sources_stay_distinct() {
        let container = object(&[("x", Value::new_object()), ("y", Value::new_object())]);
        let dup = duplicate(&container).unwrap();
        assert!(!dup.get("x").ptr_eq(&dup.get("y")));
    }

    #[test]
    fn test_independent_mutation() {
        let inner = object(&[("v", num(1.0))]);
        let src = object(&[("inner", inner.clone())]);
        let dup = duplicate(&src).unwrap();

        dup.get("inner").set("v", num(2.0));
        inner.set("w", num(3.0));
        assert_eq!(inner.get("v"), num(1.0));
        assert!(dup.get("inner").get("w").is_undefined());
    }
}

mod descriptors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hidden_and_readonly_properties_keep_flags() {
        let src = Value::new_object();
        src.define_property("hidden", Property::data_with_flags(num(1.0), PropertyFlags::HIDDEN));
        src.define_property("fixed", Property::data_with_flags(num(2.0), PropertyFlags::ENUMERABLE));

        let dup = duplicate(&src).unwrap();
        assert_eq!(dup.get_own_property("hidden").unwrap().flags(), PropertyFlags::HIDDEN);
        assert_eq!(dup.get_own_property("fixed").unwrap().flags(), PropertyFlags::ENUMERABLE);
        assert!(deep_equal(&dup, &src));
    }

    #[test]
    fn test_accessor_is_shared_not_invoked() {
        let getter = Value::new_function(deepcopy::Function::new("get", |this, _| Ok(this.get("base"))));
        let src = object(&[("base", num(10.0))]);
        src.define_property("value", Property::accessor(Some(getter.clone()), None, PropertyFlags::DEFAULT));

        let dup = duplicate(&src).unwrap();
        dup.set("base", num(20.0));
        assert_eq!(dup.read("value").unwrap(), num(20.0));
        assert_eq!(src.read("value").unwrap(), num(10.0));
    }

    #[test]
    fn test_symbol_keys_copied_well_known_skipped() {
        let tag = Symbol::new(Some("tag"));
        let src = Value::new_object();
        src.set(tag.clone(), num(1.0));
        src.set(WellKnownSymbol::Iterator, num(2.0));

        let dup = duplicate(&src).unwrap();
        assert_eq!(dup.get(tag), num(1.0));
        assert!(!dup.has_own_property(WellKnownSymbol::Iterator));
    }

    #[test]
    fn test_frozen_object_stays_frozen() {
        let src = object(&[("a", num(1.0))]);
        src.freeze();
        let dup = duplicate(&src).unwrap();
        assert!(!dup.is_extensible());
        assert!(!dup.set("a", num(5.0)));
        assert!(deep_equal(&dup, &src));
    }

    #[test]
    fn test_prototype_is_shared() {
        let proto = object(&[("greet", Value::from("hi"))]);
        let src = Value::new_object_with_prototype(proto.as_object().cloned());
        let dup = duplicate(&src).unwrap();
        assert_eq!(dup.get("greet"), Value::from("hi"));
        assert!(Value::Object(dup.prototype().unwrap()).ptr_eq(&proto));
    }
}

mod containers {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sparse_array_holes() {
        let src = Value::new_sparse_array(vec![Some(num(1.0)), None, Some(num(3.0))]);
        let dup = duplicate(&src).unwrap();
        assert_eq!(dup.array_len(), Some(3));
        assert!(!dup.has_own_property("1"));
        assert!(deep_equal(&dup, &src));
    }

    #[test]
    fn test_map_values_are_duplicated() {
        let v = object(&[("v", num(1.0))]);
        let src = Value::new_map(vec![(Value::from("k"), v.clone())]);

        let dup = duplicate(&src).unwrap();
        assert!(dup.map_entries().is_some());
        let got = dup.map_get(&Value::from("k")).unwrap();
        assert!(deep_equal(&got, &v));
        assert!(!got.ptr_eq(&v));
    }

    #[test]
    fn test_map_object_keys_are_duplicated() {
        let key = Value::new_object();
        let src = Value::new_map(vec![(key.clone(), num(1.0))]);
        let dup = duplicate(&src).unwrap();
        assert!(dup.map_get(&key).is_none());
        let entries = dup.map_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].0.ptr_eq(&key));
    }

    #[test]
    fn test_set_members_and_order() {
        let member = Value::new_object();
        let src = Value::new_set(vec![num(3.0), member.clone(), num(1.0)]);
        let dup = duplicate(&src).unwrap();
        let values = dup.set_values().unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], num(3.0));
        assert!(!values[1].ptr_eq(&member));
        assert!(deep_equal(&dup, &src));
    }

    #[test]
    fn test_extra_properties_on_collections() {
        let src = Value::new_set(vec![]);
        src.set("meta", object(&[("x", num(1.0))]));
        let dup = duplicate(&src).unwrap();
        assert_eq!(dup.get("meta").get("x"), num(1.0));
        assert!(!dup.get("meta").ptr_eq(&src.get("meta")));
    }
}

mod builtins {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_date_round_trip() {
        for time in [0.0, 1_700_000_000_000.0, -1.0, f64::NAN] {
            let src = Value::new_date(time);
            let dup = duplicate(&src).unwrap();
            assert!(!dup.ptr_eq(&src));
            let (a, b) = (src.date_value().unwrap(), dup.date_value().unwrap());
            assert!(a == b || (a.is_nan() && b.is_nan()));
        }
    }

    #[test]
    fn test_same_date_reached_twice_duplicates_once() {
        let date = Value::new_date(1.0);
        let dup = duplicate(&array(&[date.clone(), date])).unwrap();
        assert!(dup.get("0").ptr_eq(&dup.get("1")));
    }

    #[test]
    fn test_regexp() {
        let src = Value::new_regexp("^h(e)llo$", "im").unwrap();
        let dup = duplicate(&src).unwrap();
        assert!(!dup.ptr_eq(&src));
        assert_eq!(dup.to_js_string(), "/^h(e)llo$/im");
        assert_eq!(dup.regexp_test("HELLO"), Some(true));
    }

    #[test]
    fn test_error_kind_and_fields() {
        let src = Value::new_error(ErrorKind::SyntaxError, "unexpected token");
        src.set("line", num(3.0));
        let dup = duplicate(&src).unwrap();
        assert!(!dup.ptr_eq(&src));
        assert_eq!(dup.error_kind(), Some(ErrorKind::SyntaxError));
        assert_eq!(dup.to_js_string(), "SyntaxError: unexpected token");
        assert!(deep_equal(&dup, &src));
    }

    #[test]
    fn test_boxed_primitives() {
        for primitive in [Value::Boolean(true), num(4.0), Value::from("boxed")] {
            let src = Value::new_boxed(&primitive).unwrap();
            let dup = duplicate(&src).unwrap();
            assert!(!dup.ptr_eq(&src));
            assert_eq!(dup.boxed_value(), Some(primitive));
        }
    }

    #[test]
    fn test_url_types() {
        let url = Value::new_url("https://user@example.com:8080/p/a/t/h?query=string#hash").unwrap();
        let dup = duplicate(&url).unwrap();
        assert!(!dup.ptr_eq(&url));
        assert_eq!(dup.url_href(), url.url_href());

        let params = Value::new_url_search_params("a=1&a=2&b=%20");
        let dup = duplicate(&params).unwrap();
        assert_eq!(dup.search_params(), params.search_params());
    }

    #[test]
    fn test_blob_and_file() {
        let blob = Value::new_blob(&[b"ab".as_slice(), b"cd".as_slice()], "Text/Plain");
        let dup = duplicate(&blob).unwrap();
        assert!(!dup.ptr_eq(&blob));
        let data = dup.blob_data().unwrap();
        assert_eq!(&*data.bytes, b"abcd");
        assert_eq!(data.mime_type, "text/plain");

        let file = Value::new_file(&[b"x".as_slice()], "notes.txt", "", 1234.0);
        let dup = duplicate(&file).unwrap();
        assert_eq!(dup.file_data(), file.file_data());
    }

    #[test]
    fn test_weak_collections_are_identity() {
        let key = Value::new_object();
        let wm = Value::new_weak_map();
        wm.weak_map_set(&key, num(1.0)).unwrap();
        assert!(duplicate(&wm).unwrap().ptr_eq(&wm));

        let ws = Value::new_weak_set();
        assert!(duplicate(&ws).unwrap().ptr_eq(&ws));
        let wr = Value::new_weak_ref(&key).unwrap();
        assert!(duplicate(&wr).unwrap().ptr_eq(&wr));
    }
}

mod binary {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_array_buffer_is_copied() {
        let src = Value::new_array_buffer(vec![1, 2, 3]);
        let dup = duplicate(&src).unwrap();
        assert!(!dup.ptr_eq(&src));
        assert_eq!(dup.array_buffer_bytes(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_int32_array() {
        let src = Value::new_typed_array_from(TypedArrayKind::Int32, &[1.0, 2.0, 3.0]);
        let dup = duplicate(&src).unwrap();
        assert!(!dup.ptr_eq(&src));
        assert_eq!(dup.typed_array_values(), Some(vec![1.0, 2.0, 3.0]));
        assert!(!dup.view_buffer().unwrap().ptr_eq(&src.view_buffer().unwrap()));

        src.typed_array_set(0, 99.0);
        assert_eq!(dup.typed_array_values(), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_typed_array_keeps_offset_and_length() {
        let buffer = Value::new_array_buffer(vec![0, 1, 2, 3, 4, 5, 6, 7]);
        let view = Value::new_typed_array(&buffer, TypedArrayKind::Uint16, 2, 2).unwrap();
        let dup = duplicate(&view).unwrap();
        assert_eq!(dup.typed_array_values(), view.typed_array_values());
        assert_eq!(dup.view_buffer().unwrap().array_buffer_len(), Some(8));
    }

    #[test]
    fn test_data_view_buffer_independence() {
        let buffer = Value::new_array_buffer(vec![9; 4]);
        let view = Value::new_data_view(&buffer, 1, 2).unwrap();
        let dup = duplicate(&view).unwrap();
        let dup_buffer = dup.view_buffer().unwrap();
        assert!(!dup_buffer.ptr_eq(&buffer));
        assert_eq!(dup_buffer.array_buffer_bytes(), Some(vec![9; 4]));
    }
}
