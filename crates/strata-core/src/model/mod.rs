mod behavior;
mod class;
mod descriptor;
mod field;
mod kind;

pub use behavior::{Behavior, BehaviorTable, GetterFn, MethodFn, RESERVED_BEHAVIORS, SetterFn};
pub use class::{ClassBuilder, ClassId, ClassRef, ModelClass};
pub use descriptor::ModelDescriptor;
pub use field::{FieldDescriptor, FieldMap, TypeClass};
pub use kind::{ClassKind, CustomModelizeFn, CustomToObjectFn, CustomType, EnumDef, EnumType};
