use super::errors::PoolError;
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};


pub type TaskResult<T> = Result<T, PoolError>;

/// Выполняет callable, превращая панику в `PoolError::Panic`
#[inline]
pub(crate) fn catch_task<T, F>(f: F) -> TaskResult<T>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| PoolError::Panic(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        return (*s).to_owned();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    if let Some(err) = payload.downcast_ref::<PoolError>() {
        return err.to_string();
    }

    // panic_any с примитивом: сохраняем значение вместе с типом
    macro_rules! primitive {
        ($($ty:ty),*) => {
            $(
                if let Some(v) = payload.downcast_ref::<$ty>() {
                    return format!("{} ({})", v, std::any::type_name::<$ty>());
                }
            )*
        };
    }
    primitive!(i32, i64, u32, u64, usize, isize, bool, char);

    format!("non-string panic payload ({:?})", (*payload).type_id())
}
