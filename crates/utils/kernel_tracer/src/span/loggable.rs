use alloc::string::String;
use core::fmt::Write;

use compact_str::CompactString;

/// 可用于 span 宏键值对中值的类型
pub trait Loggable {
    fn log(&self, writer: &mut CompactString);
}

// 要经过这个转一道。
// 无法 impl<T: Display> Loggable for T 后再去给其他上游类型 impl Loggable 因为上游随时可能为该类型实现 Display，导致冲突
trait SpecDisplay: core::fmt::Display {}

macro_rules! mydisplay_impl {
    ($($t:tt)*) => ($(
        impl SpecDisplay for $t {}
    )*);
}

mydisplay_impl!(u8 u16 u32 u64 usize i8 i16 i32 i64 isize bool str char String CompactString);

impl<T: SpecDisplay + ?Sized> Loggable for T {
    fn log(&self, writer: &mut CompactString) {
        let _ = write!(writer, "{self}");
    }
}

impl<T: SpecDisplay + ?Sized> SpecDisplay for &T {}

impl<T: Loggable> Loggable for Option<T> {
    fn log(&self, writer: &mut CompactString) {
        match self {
            Some(value) => value.log(writer),
            None => writer.push_str("None"),
        }
    }
}
