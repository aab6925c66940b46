// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Mapping logical ids to physical resources.
//!
//! Board wiring is rarely uniform: the first sixteen cages may hang off one CPLD and the next
//! sixteen off another, presence GPIOs count down from the top of each I/O expander, i2c mux
//! channels are assigned in whatever order the layout engineer found convenient.
//! A [`RangeMap`] expresses such wiring as a short list of linear [`Segment`]s.
//!
//! # Examples
//!
//! ```
//! use onlp_platform::locator::{RangeMap, Segment};
//!
//! // ports 0-7 on mux channels 26.., ports 8-15 on 18..
//! static EEPROM_BUS: RangeMap = RangeMap::new(&[
//!     Segment::new(0, 7, 26),
//!     Segment::new(8, 15, 18),
//! ]);
//! assert_eq!(EEPROM_BUS.map(0), Some(26));
//! assert_eq!(EEPROM_BUS.map(9), Some(19));
//! assert_eq!(EEPROM_BUS.map(16), None);
//! ```

use std::path::PathBuf;

use sysfs::gpio::Gpio;

/// A linear piece of a [`RangeMap`]: ids `first..=last` map to `base + (id - first) * stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// First id covered (inclusive).
    pub first: u32,
    /// Last id covered (inclusive).
    pub last: u32,
    /// Value of `first`.
    pub base: u32,
    /// Increment per id; negative for resources numbered downwards.
    pub stride: i32,
}

impl Segment {
    /// Segment with stride 1.
    #[must_use]
    pub const fn new(first: u32, last: u32, base: u32) -> Segment {
        Segment {
            first,
            last,
            base,
            stride: 1,
        }
    }

    /// Segment counting down from `base`.
    #[must_use]
    pub const fn descending(first: u32, last: u32, base: u32) -> Segment {
        Segment {
            first,
            last,
            base,
            stride: -1,
        }
    }

    /// Same segment with another stride.
    #[must_use]
    pub const fn with_stride(self, stride: i32) -> Segment {
        Segment { stride, ..self }
    }

    /// True if `id` falls in this segment.
    #[must_use]
    pub const fn contains(&self, id: u32) -> bool {
        id >= self.first && id <= self.last
    }

    /// Map `id`, or `None` if it is outside the segment or the result leaves the `u32` range.
    #[must_use]
    pub fn map(&self, id: u32) -> Option<u32> {
        if !self.contains(id) {
            return None;
        }
        let offset = i64::from(id - self.first) * i64::from(self.stride);
        u32::try_from(i64::from(self.base) + offset).ok()
    }

    /// Number of ids covered.
    #[must_use]
    pub const fn len(&self) -> u32 {
        if self.last < self.first {
            0
        } else {
            self.last - self.first + 1
        }
    }

    /// True if the segment covers no id.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered list of [`Segment`]s; the first segment containing an id decides its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeMap(&'static [Segment]);

impl RangeMap {
    /// An empty map.
    pub const EMPTY: RangeMap = RangeMap(&[]);

    /// Build a map from its segments.
    #[must_use]
    pub const fn new(segments: &'static [Segment]) -> RangeMap {
        RangeMap(segments)
    }

    /// The segments, in lookup order.
    #[must_use]
    pub const fn segments(&self) -> &'static [Segment] {
        self.0
    }

    /// Map `id`, or `None` if no segment covers it.
    #[must_use]
    pub fn map(&self, id: u32) -> Option<u32> {
        self.locate(id).map(|(_, value)| value)
    }

    /// Map `id` and report which segment matched.
    ///
    /// Boards keep per-segment data (e.g. which CPLD serves a range of ports) in a slice
    /// parallel to the segments.
    #[must_use]
    pub fn locate(&self, id: u32) -> Option<(usize, u32)> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, segment)| segment.contains(id))
            .and_then(|(index, segment)| segment.map(id).map(|value| (index, value)))
    }

    /// True if some segment covers `id`.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.0.iter().any(|segment| segment.contains(id))
    }

    /// Every covered id, in segment order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + use<> {
        self.0.iter().flat_map(|segment| segment.first..=segment.last)
    }
}

/// A static path with `{}` slots filled in from numbers.
///
/// ```
/// use onlp_platform::locator::PathTemplate;
///
/// let eeprom = PathTemplate::new("/sys/bus/i2c/devices/{}-0050/eeprom");
/// assert_eq!(
///     eeprom.render(&[18]).to_str(),
///     Some("/sys/bus/i2c/devices/18-0050/eeprom")
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathTemplate(&'static str);

impl PathTemplate {
    /// Wrap a template.
    #[must_use]
    pub const fn new(template: &'static str) -> PathTemplate {
        PathTemplate(template)
    }

    /// The raw template.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Fill slots left to right; slots without a value are kept verbatim.
    #[must_use]
    pub fn render(&self, values: &[u32]) -> PathBuf {
        let mut out = String::with_capacity(self.0.len() + 8);
        let mut values = values.iter();
        let mut rest = self.0;
        while let Some(pos) = rest.find("{}") {
            out.push_str(&rest[..pos]);
            match values.next() {
                Some(value) => out.push_str(&value.to_string()),
                None => out.push_str("{}"),
            }
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        PathBuf::from(out)
    }
}

/// Where a single value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// An attribute file at a fixed path.
    File(&'static str),
    /// An attribute in the hwmon directory of a device; the hwmon index is found at runtime.
    Hwmon {
        /// device directory, e.g. `/sys/bus/i2c/devices/3-0048`
        device: &'static str,
        /// attribute name, e.g. `temp1_input`
        attr: &'static str,
    },
    /// A GPIO line, read as 0/1 after polarity.
    Gpio(Gpio),
    /// A BMC attribute; the raw value is multiplied by `scale`.
    Bmc {
        /// attribute id
        id: u32,
        /// unit conversion factor (e.g. 1000 for °C to m°C)
        scale: i32,
    },
    /// A BMC attribute when a BMC is present, the fallback otherwise.
    BmcOr {
        /// attribute id
        id: u32,
        /// unit conversion factor
        scale: i32,
        /// used when no BMC is present
        fallback: &'static Locator,
    },
}

#[cfg(any(test, feature = "bolero"))]
mod contract {
    use super::Segment;
    use bolero::{Driver, TypeGenerator};

    impl TypeGenerator for Segment {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            let first = driver.produce::<u16>()?;
            let len = driver.produce::<u8>()?;
            Some(Segment {
                first: u32::from(first),
                last: u32::from(first) + u32::from(len),
                base: driver.produce::<u32>()?,
                stride: i32::from(driver.produce::<i8>()?),
            })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    static GPIO_PRESENT: RangeMap = RangeMap::new(&[
        Segment::descending(0, 15, 511),
        Segment::descending(16, 31, 495),
        Segment::new(32, 33, 100).with_stride(4),
    ]);

    #[test]
    fn piecewise_lookup() {
        assert_eq!(GPIO_PRESENT.map(0), Some(511));
        assert_eq!(GPIO_PRESENT.map(15), Some(496));
        assert_eq!(GPIO_PRESENT.map(16), Some(495));
        assert_eq!(GPIO_PRESENT.map(31), Some(480));
        assert_eq!(GPIO_PRESENT.map(33), Some(104));
        assert_eq!(GPIO_PRESENT.map(34), None);
        assert_eq!(GPIO_PRESENT.locate(20), Some((1, 491)));
        assert_eq!(GPIO_PRESENT.ids().count(), 34);
        assert!(RangeMap::EMPTY.map(0).is_none());
    }

    #[test]
    fn first_segment_wins() {
        static OVERLAP: RangeMap =
            RangeMap::new(&[Segment::new(0, 3, 10), Segment::new(2, 5, 100)]);
        assert_eq!(OVERLAP.map(2), Some(12));
        assert_eq!(OVERLAP.map(4), Some(102));
    }

    #[test]
    fn underflow_is_none() {
        let seg = Segment::descending(0, 10, 3);
        assert_eq!(seg.map(3), Some(0));
        assert_eq!(seg.map(4), None);
    }

    #[test]
    fn segment_map_is_linear() {
        bolero::check!().with_type().for_each(|segment: &Segment| {
            for id in [segment.first, segment.last] {
                if let Some(value) = segment.map(id) {
                    let expected = i64::from(segment.base)
                        + i64::from(id - segment.first) * i64::from(segment.stride);
                    assert_eq!(i64::from(value), expected);
                }
            }
            assert_eq!(segment.map(segment.last + 1), None);
            if segment.first > 0 {
                assert_eq!(segment.map(segment.first - 1), None);
            }
            assert_eq!(segment.len(), segment.last - segment.first + 1);
        });
    }

    #[test]
    fn templates() {
        let t = PathTemplate::new("/sys/bus/i2c/devices/{}-0060/module_present_{}");
        assert_eq!(
            t.render(&[11, 3]),
            PathBuf::from("/sys/bus/i2c/devices/11-0060/module_present_3")
        );
        assert_eq!(
            t.render(&[11]),
            PathBuf::from("/sys/bus/i2c/devices/11-0060/module_present_{}")
        );
        assert_eq!(
            PathTemplate::new("/sys/fixed").render(&[1, 2]),
            PathBuf::from("/sys/fixed")
        );
    }
}
