//! Sliding-window geometry shared by convolution and pooling.

use crate::ensure_contract;
use crate::error::{GraphError, GraphResult};
use crate::tensor::shape::{dilated_extent, sliding_window_extent};

use super::common::per_axis;

/// Strides, dilations and paddings resolved to one entry per spatial axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Window {
    pub(crate) strides: Vec<u32>,
    pub(crate) dilations: Vec<u32>,
    pub(crate) start_padding: Vec<u32>,
    pub(crate) end_padding: Vec<u32>,
}

impl Window {
    /// Unsupplied strides and dilations default to 1, paddings to 0.
    pub(crate) fn resolve(
        op: &'static str,
        spatial_axes: usize,
        strides: Option<&[u32]>,
        dilations: Option<&[u32]>,
        start_padding: Option<&[u32]>,
        end_padding: Option<&[u32]>,
    ) -> GraphResult<Self> {
        let window = Self {
            strides: per_axis(op, "strides", strides, spatial_axes, 1)?,
            dilations: per_axis(op, "dilations", dilations, spatial_axes, 1)?,
            start_padding: per_axis(op, "start padding", start_padding, spatial_axes, 0)?,
            end_padding: per_axis(op, "end padding", end_padding, spatial_axes, 0)?,
        };
        ensure_contract!(
            window.strides.iter().all(|stride| *stride != 0),
            op,
            "strides must be non-zero, got {:?}",
            window.strides
        );
        ensure_contract!(
            window.dilations.iter().all(|dilation| *dilation != 0),
            op,
            "dilations must be non-zero, got {:?}",
            window.dilations
        );
        Ok(window)
    }

    fn kernel(&self, op: &'static str, axis: usize, window: u32) -> GraphResult<u32> {
        dilated_extent(window, self.dilations[axis]).ok_or_else(|| {
            GraphError::contract(op, format!("dilated window of spatial axis {axis} overflows"))
        })
    }

    fn padded(&self, op: &'static str, axis: usize, input: u32) -> GraphResult<u32> {
        input
            .checked_add(self.start_padding[axis])
            .and_then(|size| size.checked_add(self.end_padding[axis]))
            .ok_or_else(|| GraphError::contract(op, format!("padded extent of axis {axis} overflows")))
    }

    /// `floor((input + pads - dilated_window) / stride) + 1`; the window must fit.
    pub(crate) fn output_extent(
        &self,
        op: &'static str,
        axis: usize,
        input: u32,
        window: u32,
    ) -> GraphResult<u32> {
        let padded = self.padded(op, axis, input)?;
        let kernel = self.kernel(op, axis, window)?;
        sliding_window_extent(padded, kernel, self.strides[axis]).ok_or_else(|| {
            GraphError::contract(
                op,
                format!(
                    "window {kernel} does not fit padded extent {padded} on spatial axis {axis}"
                ),
            )
        })
    }

    /// Like [`Window::output_extent`] but a window larger than the padded input yields 1.
    pub(crate) fn pooled_extent(
        &self,
        op: &'static str,
        axis: usize,
        input: u32,
        window: u32,
    ) -> GraphResult<u32> {
        let padded = self.padded(op, axis, input)?;
        let kernel = self.kernel(op, axis, window)?;
        Ok(sliding_window_extent(padded, kernel, self.strides[axis]).unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::Window;

    #[test]
    fn defaults_fill_every_axis() {
        let window = Window::resolve("test", 2, None, None, None, None)
            .unwrap_or_else(|err| panic!("unexpected error: {err}"));
        assert_eq!(window.strides, vec![1, 1]);
        assert_eq!(window.start_padding, vec![0, 0]);
    }

    #[test]
    fn zero_stride_is_rejected() {
        Window::resolve("test", 2, Some(&[1, 0]), None, None, None)
            .expect_err("zero stride must fail");
    }

    #[test]
    fn dilated_window_extent() {
        let window = Window::resolve("test", 1, Some(&[2]), Some(&[2]), Some(&[1]), Some(&[1]))
            .unwrap_or_else(|err| panic!("unexpected error: {err}"));
        // padded 10, dilated kernel 5, stride 2
        assert_eq!(window.output_extent("test", 0, 8, 3).ok(), Some(3));
        assert_eq!(window.pooled_extent("test", 0, 2, 9).ok(), Some(1));
        assert!(window.output_extent("test", 0, 2, 9).is_err());
    }
}
