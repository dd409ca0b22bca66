//! Upcasting helper so trait objects can be downcast to their concrete type

use std::any::Any;

/// Access a value as `dyn Any`
///
/// Implemented for every `'static` sized type; trait objects that list it as a
/// supertrait forward to the concrete implementation through their vtable.
/// Call it on `&dyn Trait`, never on a `Box<dyn Trait>` (the box itself is
/// `Any` and would be returned instead).
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;

    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
