//! Pluggable key ordering and key/record release strategies.

use std::cmp::Ordering;

/// A strict total order over keys.
///
/// The index never inspects keys except through this trait, so two keys that
/// compare `Equal` are the same key.
pub trait KeyComparator<K> {
    fn compare(&self, left: &K, right: &K) -> Ordering;
}

/// Orders keys by their `Ord` implementation.
///
/// For `Option<String>` keys this places an absent key before every present
/// one, matching the vehicle-identifier ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord> KeyComparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.cmp(right)
    }
}

/// Orders keys with a caller-supplied function.
#[derive(Clone, Copy)]
pub struct CompareFn<F>(pub F);

impl<K, F> KeyComparator<K> for CompareFn<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        (self.0)(left, right)
    }
}

/// Receives ownership of keys and records the index lets go of.
///
/// Called for a rejected insert's key and record, and for every stored key
/// (leaf keys and separator copies) and record at teardown. Each value is
/// handed over exactly once.
pub trait ReleaseHooks<K, R> {
    fn release_key(&mut self, key: K) {
        drop(key);
    }

    fn release_record(&mut self, record: R) {
        drop(record);
    }
}

/// Releases by dropping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropRelease;

impl<K, R> ReleaseHooks<K, R> for DropRelease {}

/// Releases through a pair of closures.
pub struct ReleaseFns<FK, FR> {
    key: FK,
    record: FR,
}

impl<FK, FR> ReleaseFns<FK, FR> {
    pub fn new(key: FK, record: FR) -> Self {
        Self { key, record }
    }
}

impl<K, R, FK, FR> ReleaseHooks<K, R> for ReleaseFns<FK, FR>
where
    FK: FnMut(K),
    FR: FnMut(R),
{
    fn release_key(&mut self, key: K) {
        (self.key)(key)
    }

    fn release_record(&mut self, record: R) {
        (self.record)(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_order_puts_absent_keys_first() {
        let cmp = NaturalOrder;
        let absent: Option<String> = None;
        let present = Some(String::from("AA11"));
        assert_eq!(cmp.compare(&absent, &present), Ordering::Less);
        assert_eq!(cmp.compare(&present, &present.clone()), Ordering::Equal);
        assert_eq!(cmp.compare(&"B".to_string(), &"A".to_string()), Ordering::Greater);
    }

    #[test]
    fn test_compare_fn_reverses() {
        let cmp = CompareFn(|a: &i32, b: &i32| b.cmp(a));
        assert_eq!(cmp.compare(&1, &2), Ordering::Greater);
        assert_eq!(cmp.compare(&2, &2), Ordering::Equal);
    }

    fn release_sample<H: ReleaseHooks<i32, &'static str>>(hooks: &mut H) {
        hooks.release_key(7);
        hooks.release_record("seven");
        hooks.release_key(8);
    }

    #[test]
    fn test_release_fns_receive_values() {
        let mut keys = Vec::new();
        let mut records = Vec::new();
        {
            let mut hooks = ReleaseFns::new(
                |k: i32| keys.push(k),
                |r: &'static str| records.push(r),
            );
            release_sample(&mut hooks);
        }
        assert_eq!(keys, vec![7, 8]);
        assert_eq!(records, vec!["seven"]);
    }

    #[test]
    fn test_drop_release_accepts_anything() {
        release_sample(&mut DropRelease);
    }
}
