use num_traits::float::FloatCore;

pub trait ToDegrees {
    fn to_degrees(self) -> Self;
}

impl<T: FloatCore> ToDegrees for T {
    #[inline(always)]
    fn to_degrees(self) -> Self {
        <T as FloatCore>::to_degrees(self)
    }
}

pub trait CollectTo: Iterator {
    fn collect_to<T>(self, collection: &mut T) -> &mut T
    where
        T: Extend<Self::Item>;
}

impl<I: Iterator> CollectTo for I {
    fn collect_to<T: Extend<I::Item>>(self, collection: &mut T) -> &mut T {
        collection.extend(self);
        collection
    }
}
