//! Input preprocessing and resampling helpers.

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma};
use ndarray::{Array2, Array3, Axis};

use super::params::ModelParameters;

type FloatMap = ImageBuffer<Luma<f32>, Vec<f32>>;

pub(crate) fn gray_from_array(mask: &Array2<u8>) -> GrayImage {
    let (h, w) = mask.dim();
    GrayImage::from_fn(w as u32, h as u32, |x, y| Luma([mask[[y as usize, x as usize]]]))
}

fn float_from_array(map: &Array2<f32>) -> FloatMap {
    let (h, w) = map.dim();
    FloatMap::from_fn(w as u32, h as u32, |x, y| Luma([map[[y as usize, x as usize]]]))
}

fn array_from_luma<T: image::Primitive>(image: &ImageBuffer<Luma<T>, Vec<T>>) -> Array2<T> {
    let (w, h) = image.dimensions();
    Array2::from_shape_fn((h as usize, w as usize), |(y, x)| image.get_pixel(x as u32, y as u32)[0])
}

fn unchanged(src: (usize, usize), dst: (usize, usize)) -> bool {
    src == dst || src.0 == 0 || src.1 == 0
}

/// Triangle-filtered resize of an HWC image, channel by channel.
pub fn resize_image(image: &Array3<u8>, height: usize, width: usize) -> Array3<u8> {
    let (src_h, src_w, channels) = image.dim();
    if unchanged((src_h, src_w), (height, width)) {
        return image.clone();
    }
    let mut out = Array3::<u8>::zeros((height, width, channels));
    for (source, mut target) in image.axis_iter(Axis(2)).zip(out.axis_iter_mut(Axis(2))) {
        let plane = gray_from_array(&source.to_owned());
        let resized = imageops::resize(&plane, width as u32, height as u32, FilterType::Triangle);
        target.assign(&array_from_luma(&resized));
    }
    out
}

/// Triangle-filtered resize of a single-channel map with values in `[0, 1]`.
///
/// The resampler clamps float samples to `[0, 1]`.
pub fn resize_map(map: &Array2<f32>, height: usize, width: usize) -> Array2<f32> {
    if unchanged(map.dim(), (height, width)) {
        return map.clone();
    }
    let resized = imageops::resize(&float_from_array(map), width as u32, height as u32, FilterType::Triangle);
    array_from_luma(&resized)
}

/// Nearest-neighbour resize of a mask.
pub fn resize_nearest(mask: &Array2<u8>, height: usize, width: usize) -> Array2<u8> {
    if unchanged(mask.dim(), (height, width)) {
        return mask.clone();
    }
    let resized = imageops::resize(&gray_from_array(mask), width as u32, height as u32, FilterType::Nearest);
    array_from_luma(&resized)
}

/// Turns HWC `u8` images into the network's CHW `f32` input.
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessor {
    pub height: usize,
    pub width: usize,
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
    pub reverse_input_channels: bool,
}

impl Preprocessor {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            mean: vec![0.0],
            scale: vec![1.0],
            reverse_input_channels: false,
        }
    }

    pub fn from_parameters(params: &ModelParameters) -> Self {
        let (height, width) = params.input_size;
        Self {
            height,
            width,
            mean: params.mean_values.iter().map(|&v| v as f32).collect(),
            scale: params.scale_values.iter().map(|&v| v as f32).collect(),
            reverse_input_channels: params.reverse_input_channels,
        }
    }

    /// Resize to the network input size.
    pub fn resize(&self, image: &Array3<u8>) -> Array3<f32> {
        resize_image(image, self.height, self.width).mapv(f32::from)
    }

    /// Channel reversal, then `(x - mean) / scale` per channel.
    pub fn input_transform(&self, mut image: Array3<f32>) -> Array3<f32> {
        if self.reverse_input_channels {
            image.invert_axis(Axis(2));
        }
        let per_channel = |values: &[f32], c: usize, default: f32| {
            values.get(c).or_else(|| values.first()).copied().unwrap_or(default)
        };
        for (c, mut channel) in image.axis_iter_mut(Axis(2)).enumerate() {
            let mean = per_channel(&self.mean, c, 0.0);
            let scale = per_channel(&self.scale, c, 1.0);
            let scale = if scale == 0.0 { 1.0 } else { scale };
            channel.mapv_inplace(|v| (v - mean) / scale);
        }
        image
    }

    /// HWC to CHW.
    pub fn change_layout(&self, image: Array3<f32>) -> Array3<f32> {
        image.permuted_axes([2, 0, 1]).as_standard_layout().into_owned()
    }

    pub fn preprocess(&self, image: &Array3<u8>) -> Array3<f32> {
        let resized = self.resize(image);
        let transformed = self.input_transform(resized);
        self.change_layout(transformed)
    }
}
