//! Polymorphic subtype resolution for embedded relation groups.
//!
//! HAL collection responses group embedded items by relation name; a server
//! exposing an inheritance hierarchy uses those names to tell subtypes apart
//! (`dogs`, `cats` under an `animals` listing). The registry maps
//! relation-name prefixes to constructors so the assembler can build the
//! concrete variant instead of the base type.

/// Insertion-ordered mapping from relation-name prefix to constructor.
///
/// Matching is case-insensitive on a prefix basis, and the **first**
/// registered prefix that matches wins - registration order is the
/// documented precedence, so register the more specific prefix first when
/// prefixes collide (`"dog"` before `"do"`).
pub struct SubtypeRegistry<T> {
    entries: Vec<(String, Constructor<T>)>,
}

type Constructor<T> = Box<dyn Fn() -> T + Send + Sync>;

impl<T> SubtypeRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a constructor for relation names starting with `prefix`.
    pub fn register(
        mut self,
        prefix: impl Into<String>,
        constructor: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        self.entries
            .push((prefix.into().to_lowercase(), Box::new(constructor)));
        self
    }

    /// Construct the subtype registered for `relation`, if any prefix matches.
    pub fn resolve(&self, relation: &str) -> Option<T> {
        let relation = relation.to_lowercase();
        self.entries
            .iter()
            .find(|(prefix, _)| relation.starts_with(prefix.as_str()))
            .map(|(_, constructor)| constructor())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for SubtypeRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for SubtypeRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(prefix, _)| prefix))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Animal {
        Generic,
        Dog,
        Cat,
    }

    #[test]
    fn prefix_match_constructs_subtype() {
        let registry = SubtypeRegistry::new().register("dog", || Animal::Dog);
        assert_eq!(registry.resolve("dogs"), Some(Animal::Dog));
    }

    #[test]
    fn match_is_case_insensitive() {
        let registry = SubtypeRegistry::new().register("Dog", || Animal::Dog);
        assert_eq!(registry.resolve("DOGS"), Some(Animal::Dog));
    }

    #[test]
    fn no_match_yields_none() {
        let registry = SubtypeRegistry::new()
            .register("dog", || Animal::Dog)
            .register("cat", || Animal::Cat);
        assert_eq!(registry.resolve("birds"), None);
    }

    #[test]
    fn first_registered_prefix_wins() {
        // Both "dog" and "do" match "dogs"; registration order decides.
        let registry = SubtypeRegistry::new()
            .register("dog", || Animal::Dog)
            .register("do", || Animal::Generic);
        assert_eq!(registry.resolve("dogs"), Some(Animal::Dog));

        let flipped = SubtypeRegistry::new()
            .register("do", || Animal::Generic)
            .register("dog", || Animal::Dog);
        assert_eq!(flipped.resolve("dogs"), Some(Animal::Generic));
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let registry: SubtypeRegistry<Animal> = SubtypeRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.resolve("dogs"), None);
    }
}
