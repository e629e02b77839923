/// Unit tests for the Lifetime enum: default, definedness, display names.
use filament_di::Lifetime;

#[test]
fn default_is_the_undefined_sentinel() {
    assert_eq!(Lifetime::default(), Lifetime::Undefined);
}

#[test]
fn definedness_matches_the_variant() {
    assert!(!Lifetime::Undefined.is_defined());
    assert!(Lifetime::Transient.is_defined());
    assert!(Lifetime::Scoped.is_defined());
    assert!(Lifetime::Singleton.is_defined());
}

#[test]
fn display_names_are_stable() {
    assert_eq!(Lifetime::Undefined.to_string(), "Undefined");
    assert_eq!(Lifetime::Transient.to_string(), "Transient");
    assert_eq!(Lifetime::Scoped.to_string(), "Scoped");
    assert_eq!(Lifetime::Singleton.to_string(), "Singleton");
}

#[test]
fn variants_are_distinct_and_copyable() {
    let all = [
        Lifetime::Undefined,
        Lifetime::Transient,
        Lifetime::Scoped,
        Lifetime::Singleton,
    ];

    for (i, a) in all.iter().enumerate() {
        for (j, b) in all.iter().enumerate() {
            if i == j {
                assert_eq!(a, b);
            } else {
                assert_ne!(a, b);
            }
        }
    }

    let copied = all[2];
    assert_eq!(copied, Lifetime::Scoped);
}
