//! Unsafe libjpeg-turbo FFI scaffolding, ported from the original
//! `JpegDecompressRAII`/`JpegCompressRAII` wrapper classes
//! (`original_source/internal/PhotoHnS/PhotoHnS.hh`) into Rust ownership.
//!
//! The original pinned each struct at a fixed address for the lifetime of
//! the C++ object; here the struct and its error manager live in separate
//! heap boxes, which pins their addresses regardless of where the owning
//! Rust value itself gets moved.

use std::os::raw::c_int;

use mozjpeg_sys::{
    jpeg_common_struct, jpeg_compress_struct, jpeg_copy_critical_parameters,
    jpeg_create_compress, jpeg_create_decompress, jpeg_decompress_struct, jpeg_destroy_compress,
    jpeg_destroy_decompress, jpeg_error_mgr, jpeg_finish_compress, jpeg_finish_decompress,
    jpeg_mem_dest, jpeg_mem_src, jpeg_read_coefficients, jpeg_read_header, jpeg_std_error,
    jpeg_write_coefficients, jvirt_barray_ptr, JBLOCK,
};

use crate::error::Error;

/// Owns a `jpeg_decompress_struct` and its error manager for the duration
/// of one decode. Never shared across threads; never moved out from under
/// libjpeg once `jpeg_read_header` has run.
pub struct JpegDecompress {
    cinfo: Box<jpeg_decompress_struct>,
    _err: Box<jpeg_error_mgr>,
}

impl JpegDecompress {
    pub fn new(data: &[u8]) -> Result<Self, Error> {
        let mut err = Box::new(unsafe { std::mem::zeroed::<jpeg_error_mgr>() });
        let mut cinfo = Box::new(unsafe { std::mem::zeroed::<jpeg_decompress_struct>() });

        unsafe {
            cinfo.err = jpeg_std_error(err.as_mut());
            jpeg_create_decompress(cinfo.as_mut());
            jpeg_mem_src(cinfo.as_mut(), data.as_ptr(), data.len() as u64);
            if jpeg_read_header(cinfo.as_mut(), true as c_int) == 0 {
                jpeg_destroy_decompress(cinfo.as_mut());
                return Err(Error::DecodeImage(
                    "libjpeg failed to read JPEG header".to_string(),
                ));
            }
        }

        Ok(Self { cinfo, _err: err })
    }

    pub fn as_mut(&mut self) -> &mut jpeg_decompress_struct {
        &mut self.cinfo
    }

    pub fn num_components(&self) -> usize {
        self.cinfo.num_components as usize
    }

    pub fn image_width(&self) -> u32 {
        self.cinfo.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.cinfo.image_height
    }

    /// `width_in_blocks`/`height_in_blocks` for one component, as computed
    /// by libjpeg from the image dimensions and that component's sampling
    /// factors (correct for chroma-subsampled components, unlike deriving
    /// it from the overall image size).
    pub fn component_block_dims(&self, component_index: usize) -> (u32, u32) {
        let comp = unsafe { *self.cinfo.comp_info.add(component_index) };
        (comp.width_in_blocks, comp.height_in_blocks)
    }

    /// Read the DCT coefficient arrays, one virtual block array per
    /// component. Must be called before `finish`.
    pub fn read_coefficients(&mut self) -> Result<*mut jvirt_barray_ptr, Error> {
        let arrays = unsafe { jpeg_read_coefficients(self.cinfo.as_mut()) };
        if arrays.is_null() {
            return Err(Error::DecodeImage(
                "libjpeg returned no coefficient arrays".to_string(),
            ));
        }
        Ok(arrays)
    }

    /// Access one component's coefficient blocks for `num_rows` block-rows
    /// starting at `start_row`, optionally for in-place mutation.
    ///
    /// # Safety
    /// `coef_arrays` must come from a prior call to [`read_coefficients`]
    /// on this same decompress context, which must still be alive.
    pub unsafe fn access_virt_barray(
        &mut self,
        coef_arrays: *mut jvirt_barray_ptr,
        component_index: usize,
        start_row: u32,
        num_rows: u32,
        writable: bool,
    ) -> *mut *mut JBLOCK {
        unsafe {
            let mem = self.cinfo.mem;
            let access = (*mem)
                .access_virt_barray
                .expect("libjpeg memory manager vtable missing access_virt_barray");
            let common = &mut self.cinfo as *mut jpeg_decompress_struct as *mut jpeg_common_struct;
            let array = *coef_arrays.add(component_index);
            access(common, array, start_row, num_rows, writable as c_int) as *mut *mut JBLOCK
        }
    }

    pub fn finish(mut self) -> Result<(), Error> {
        let ok = unsafe { jpeg_finish_decompress(self.cinfo.as_mut()) };
        if ok == 0 {
            return Err(Error::DecodeImage(
                "libjpeg failed to finish decompression".to_string(),
            ));
        }
        Ok(())
    }
}

impl Drop for JpegDecompress {
    fn drop(&mut self) {
        unsafe { jpeg_destroy_decompress(self.cinfo.as_mut()) };
    }
}

/// Owns a `jpeg_compress_struct` and its error manager for one re-encode.
pub struct JpegCompress {
    cinfo: Box<jpeg_compress_struct>,
    _err: Box<jpeg_error_mgr>,
    dest_buffer: Box<*mut u8>,
    dest_size: Box<u64>,
}

impl JpegCompress {
    pub fn new() -> Self {
        let mut err = Box::new(unsafe { std::mem::zeroed::<jpeg_error_mgr>() });
        let mut cinfo = Box::new(unsafe { std::mem::zeroed::<jpeg_compress_struct>() });
        unsafe {
            cinfo.err = jpeg_std_error(err.as_mut());
            jpeg_create_compress(cinfo.as_mut());
        }
        Self {
            cinfo,
            _err: err,
            dest_buffer: Box::new(std::ptr::null_mut()),
            dest_size: Box::new(0),
        }
    }

    pub fn as_mut(&mut self) -> &mut jpeg_compress_struct {
        &mut self.cinfo
    }

    /// Copy quantization tables, sampling factors and friends from a
    /// decompress context, then bind an in-memory output buffer owned by
    /// libjpeg's allocator.
    pub fn copy_critical_parameters_from(&mut self, src: &mut JpegDecompress) {
        unsafe {
            jpeg_copy_critical_parameters(src.as_mut(), self.cinfo.as_mut());
            // Force a baseline-sequential re-encode regardless of the
            // source scan type, matching the original PhotoHnS behavior.
            self.cinfo.optimize_coding = false as i32;
            jpeg_mem_dest(self.cinfo.as_mut(), self.dest_buffer.as_mut(), self.dest_size.as_mut());
        }
    }

    /// Write the (possibly mutated) coefficient arrays out as a complete
    /// JPEG stream and return the encoded bytes.
    pub fn write_coefficients(mut self, coef_arrays: *mut jvirt_barray_ptr) -> Result<Vec<u8>, Error> {
        unsafe {
            jpeg_write_coefficients(self.cinfo.as_mut(), coef_arrays);
            jpeg_finish_compress(self.cinfo.as_mut());
            let out = std::slice::from_raw_parts(*self.dest_buffer, *self.dest_size as usize).to_vec();
            Ok(out)
        }
    }
}

impl Default for JpegCompress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for JpegCompress {
    fn drop(&mut self) {
        unsafe {
            jpeg_destroy_compress(self.cinfo.as_mut());
            if !self.dest_buffer.is_null() {
                libc_free(*self.dest_buffer);
            }
        }
    }
}

/// `jpeg_mem_dest` allocates its buffer with the platform's C allocator;
/// libjpeg's own `jpeg_destroy_compress` does not free it, so the mem
/// destination manager's `free_in_buffer`/`term_destination` path leaves
/// this to the caller. Mirrors mozjpeg-sys's documented ownership contract
/// for `jpeg_mem_dest`.
unsafe fn libc_free(ptr: *mut u8) {
    unsafe extern "C" {
        fn free(ptr: *mut std::os::raw::c_void);
    }
    unsafe { free(ptr as *mut std::os::raw::c_void) };
}
