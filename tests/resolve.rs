use filament_di::{
    resolve, AnyArc, BindingMap, DiError, DiResult, Lifetime, Resolver, ResolverExt,
    ServiceProvider, TypeKey,
};
use std::sync::Arc;

#[test]
fn nil_resolver_fails_before_anything_else() {
    let err = resolve::<String>(None).unwrap_err();
    assert!(matches!(err, DiError::NilResolver));
    assert_eq!(
        format!("{}", err),
        "cannot resolve instances from a nil resolver"
    );
}

#[test]
fn typed_helper_narrows_the_resolved_value() {
    let mut bindings = BindingMap::new();
    bindings.bind::<String, _>(Lifetime::Singleton, |_| Ok("narrowed".to_string()));

    let provider = ServiceProvider::new(Arc::new(bindings));

    let value = resolve::<String>(Some(&provider)).unwrap();
    assert_eq!(*value, "narrowed");
}

#[test]
fn resolver_errors_pass_through_unchanged() {
    let provider = ServiceProvider::new(Arc::new(BindingMap::new()));

    let err = resolve::<String>(Some(&provider)).unwrap_err();
    assert!(matches!(err, DiError::NotFound(_)));
}

// A broken resolver that always returns a u32 no matter what was asked for.
struct LyingResolver;

impl Resolver for LyingResolver {
    fn get_any(&self, _key: &TypeKey) -> DiResult<AnyArc> {
        Ok(Arc::new(1u32))
    }
}

#[test]
fn mistyped_result_is_an_invalid_resolution() {
    let resolver = LyingResolver;

    let err = resolve::<String>(Some(&resolver)).unwrap_err();
    match err {
        DiError::InvalidResolution { requested, returned } => {
            assert_eq!(requested, TypeKey::of::<String>());
            assert_eq!(returned, std::any::TypeId::of::<u32>());
        }
        other => panic!("expected InvalidResolution, got {:?}", other),
    }
}

#[test]
fn correctly_typed_result_from_a_custom_resolver_is_accepted() {
    let resolver = LyingResolver;

    // The same resolver is honest about u32.
    let value = resolve::<u32>(Some(&resolver)).unwrap();
    assert_eq!(*value, 1);
}

#[test]
fn get_works_through_a_dyn_resolver() {
    let mut bindings = BindingMap::new();
    bindings.bind::<u64, _>(Lifetime::Singleton, |_| Ok(8u64));

    let provider = ServiceProvider::new(Arc::new(bindings));
    let dynamic: &dyn Resolver = &provider;

    let value = dynamic.get::<u64>().unwrap();
    assert_eq!(*value, 8);
}
