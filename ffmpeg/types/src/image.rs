/*!
    Row-major BGR image buffer.
*/

/**
    Bytes per pixel of [`BgrImage`].
*/
const CHANNELS: usize = 3;

/**
    A decoded picture in packed 24-bit B,G,R order.

    Rows are stored top to bottom without padding, so the stride is always
    `width * 3`. The buffer is reused across reads when the size is unchanged.
*/
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BgrImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl BgrImage {
    /**
        Create a black image of the given size.
    */
    pub fn new(width: u32, height: u32) -> Self {
        let mut image = Self::empty();
        image.resize(width, height);
        image
    }

    /**
        Create an image with no pixels.
    */
    pub const fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    /**
        Create an image from tightly packed BGR rows.

        Returns `None` if `data` does not hold exactly `width * height` pixels.
    */
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * CHANNELS {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /**
        Resize to the given dimensions, keeping the allocation when possible.

        Pixel contents are unspecified afterwards.
    */
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data
            .resize(width as usize * height as usize * CHANNELS, 0);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /**
        Number of bytes per row.
    */
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /**
        Returns the `[b, g, r]` value at the given position.
    */
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = y as usize * self.stride() + x as usize * CHANNELS;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /**
        Consume the image, returning its pixels in R,G,B order.
    */
    pub fn into_rgb_bytes(mut self) -> Vec<u8> {
        for pixel in self.data.chunks_exact_mut(CHANNELS) {
            pixel.swap(0, 2);
        }
        self.data
    }
}

impl std::fmt::Debug for BgrImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BgrImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
