use std::{fmt, marker::PhantomData};

use crate::{binaries::Endian, format::MapType};

use super::{
    layout::{FieldLayout, FieldValue, RecordKind},
    lump::LumpContext,
};

/// One record of kind `K` overlaying a stride-long window of its lump.
///
/// `B` is the window: `&[u8]` for read-only views, `&mut [u8]` for views that
/// write back in place, `Vec<u8>` for detached copies. Fields that the format
/// does not store read as the value type's sentinel and ignore writes.
pub struct Record<B, K> {
    data: B,
    ctx: LumpContext,
    _kind: PhantomData<fn() -> K>,
}

impl<B, K: RecordKind> Record<B, K> {
    pub(crate) fn new(data: B, ctx: LumpContext) -> Self {
        Self {
            data,
            ctx,
            _kind: PhantomData,
        }
    }

    pub fn context(&self) -> LumpContext {
        self.ctx
    }

    pub fn format(&self) -> MapType {
        self.ctx.format
    }

    pub fn lump_version(&self) -> i32 {
        self.ctx.version
    }

    pub fn endian(&self) -> Endian {
        self.ctx.endian
    }

    pub fn layout(&self, field: K::Field) -> Option<FieldLayout> {
        K::layout(field, self.ctx.format, self.ctx.version)
    }

    pub fn has(&self, field: K::Field) -> bool {
        self.layout(field).is_some()
    }
}

impl<B: AsRef<[u8]>, K: RecordKind> Record<B, K> {
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_ref()
    }

    pub fn get<V: FieldValue>(&self, field: K::Field) -> V {
        self.layout(field)
            .and_then(|layout| {
                let bytes = self.data.as_ref().get(layout.range())?;
                V::decode(layout.encoding, bytes, self.ctx.endian)
            })
            .unwrap_or_else(V::sentinel)
    }

    /// Any integer field, widened. `-1` when absent.
    pub fn int(&self, field: K::Field) -> i64 {
        self.get(field)
    }

    pub fn to_owned_record(&self) -> Record<Vec<u8>, K> {
        Record::new(self.as_bytes().to_vec(), self.ctx)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>, K: RecordKind> Record<B, K> {
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.data.as_mut()
    }

    pub fn set<V: FieldValue>(&mut self, field: K::Field, value: V) {
        let Some(layout) = self.layout(field) else {
            return;
        };
        let endian = self.ctx.endian;
        let Some(bytes) = self.data.as_mut().get_mut(layout.range()) else {
            return;
        };
        if !value.encode(layout.encoding, bytes, endian) {
            log::warn!(
                "{} {:?} is stored as {:?}, dropping write of {}",
                K::NAME,
                field,
                layout.encoding,
                std::any::type_name::<V>()
            );
        }
    }

    pub fn set_int(&mut self, field: K::Field, value: i64) {
        self.set(field, value)
    }
}

impl<B: AsRef<[u8]>, K: RecordKind> fmt::Debug for Record<B, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::NAME)
            .field("format", &self.ctx.format)
            .field("version", &self.ctx.version)
            .field("bytes", &self.as_bytes())
            .finish()
    }
}

/// Declares a record kind's field enum and its named accessors.
///
/// Each line `getter, setter: Type => Variant` adds `Variant` to the field
/// enum, a getter on every readable `Record<B, Kind>` and a setter on every
/// writable one.
macro_rules! record_fields {
    (
        $kind:ident, $field:ident {
            $( $(#[$meta:meta])* $get:ident, $set:ident: $ty:ty => $variant:ident; )*
        }
    ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $field {
            $( $variant, )*
        }

        impl $field {
            pub const ALL: &'static [$field] = &[$( $field::$variant, )*];
        }

        impl<B: AsRef<[u8]>> $crate::bsp::record::Record<B, $kind> {
            $(
                $(#[$meta])*
                pub fn $get(&self) -> $ty {
                    self.get($field::$variant)
                }
            )*
        }

        impl<B: AsRef<[u8]> + AsMut<[u8]>> $crate::bsp::record::Record<B, $kind> {
            $(
                pub fn $set(&mut self, value: $ty) {
                    self.set($field::$variant, value)
                }
            )*
        }
    };
}

pub(crate) use record_fields;
