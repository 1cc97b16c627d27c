use std::borrow::Cow;

use super::directive::{DirectiveSet, ExceptionMetered, Metered, Timed};
use crate::registry::name;

/// Where a method is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Declaration {
    /// An inherent or trait-impl method of a concrete type.
    #[default]
    Type,
    /// A trait method, as seen through `dyn Trait` or a generic bound. Its
    /// directives may differ from the implementing type's.
    Trait,
}

/// A callable's identity plus the directives declared on it.
#[derive(Debug, Clone)]
pub struct Method {
    declaring_type: Cow<'static, str>,
    name: Cow<'static, str>,
    declaration: Declaration,
    directives: DirectiveSet,
}

impl Method {
    pub fn new(
        declaring_type: impl Into<Cow<'static, str>>,
        name: impl Into<Cow<'static, str>>,
    ) -> Self {
        Method {
            declaring_type: declaring_type.into(),
            name: name.into(),
            declaration: Declaration::Type,
            directives: DirectiveSet::default(),
        }
    }

    /// A method declared on `T`, named after `T`'s fully qualified type name
    /// with `::` turned into `.` and generic arguments dropped, so
    /// `shop::Orders<String>` declares as `shop.Orders`.
    ///
    /// For `dyn Trait` the `dyn ` prefix and any `+ Send`-style bounds are
    /// dropped and the method is marked as trait-declared.
    pub fn of<T: ?Sized>(name: impl Into<Cow<'static, str>>) -> Self {
        let type_name = std::any::type_name::<T>();
        match type_name.strip_prefix("dyn ") {
            Some(trait_name) => {
                let trait_name = trait_name.split(" + ").next().unwrap_or(trait_name);
                Method::new(dotted(trait_name), name).on_trait()
            }
            None => Method::new(dotted(type_name), name),
        }
    }

    pub fn on_trait(mut self) -> Self {
        self.declaration = Declaration::Trait;
        self
    }

    pub fn timed(mut self, timed: Timed) -> Self {
        self.directives.timed = Some(timed);
        self
    }

    pub fn metered(mut self, metered: Metered) -> Self {
        self.directives.metered = Some(metered);
        self
    }

    pub fn exception_metered(mut self, exception_metered: ExceptionMetered) -> Self {
        self.directives.exception_metered = Some(exception_metered);
        self
    }

    pub fn with_directives(mut self, directives: DirectiveSet) -> Self {
        self.directives = directives;
        self
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaration(&self) -> Declaration {
        self.declaration
    }

    pub fn is_trait_declared(&self) -> bool {
        self.declaration == Declaration::Trait
    }

    pub fn directives(&self) -> &DirectiveSet {
        &self.directives
    }

    /// `declaring_type.name`
    pub fn qualified_name(&self) -> String {
        name(&self.declaring_type, [&*self.name])
    }
}

/// `a::b::C<d::E>` as `a.b.C`.
fn dotted(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.replace("::", ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inventory;

    trait Repository {}

    mod orders {
        pub struct OrderService<T>(pub T);
    }

    #[test]
    fn test_of_uses_dotted_type_name() {
        let method = Method::of::<Inventory>("restock");
        assert_eq!(
            method.declaring_type(),
            "callmetrics.directives.method.tests.Inventory"
        );
        assert_eq!(method.name(), "restock");
        assert!(!method.is_trait_declared());
        assert!(method.directives().is_empty());
    }

    #[test]
    fn test_of_drops_generic_arguments() {
        let method = Method::of::<orders::OrderService<String>>("create");
        assert_eq!(
            method.qualified_name(),
            "callmetrics.directives.method.tests.orders.OrderService.create"
        );
        assert!(!method.qualified_name().contains("::"));
    }

    #[test]
    fn test_of_dyn_trait_is_trait_declared() {
        let method = Method::of::<dyn Repository>("find");
        assert!(method.is_trait_declared());
        assert_eq!(
            method.declaring_type(),
            "callmetrics.directives.method.tests.Repository"
        );

        let bounded = Method::of::<dyn Repository + Send + Sync>("find");
        assert_eq!(bounded.declaring_type(), method.declaring_type());
    }

    #[test]
    fn test_dotted() {
        assert_eq!(dotted("a::b::C<d::E<f::G>>"), "a.b.C");
        assert_eq!(dotted("shop.Orders"), "shop.Orders");
    }

    #[test]
    fn test_builders_attach_directives() {
        let method = Method::new("shop.Inventory", "restock")
            .timed(Timed::new())
            .metered(Metered::named("calls"));

        assert_eq!(method.qualified_name(), "shop.Inventory.restock");
        assert!(method.directives().timed.is_some());
        assert_eq!(
            method.directives().metered.as_ref().and_then(|m| m.name.as_deref()),
            Some("calls")
        );
        assert!(method.directives().exception_metered.is_none());
    }
}
