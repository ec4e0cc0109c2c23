use std::io::{Cursor, Read, Result};

/// A reader that reports `(bytes so far, total)` after every read.
pub struct ProgressIO<IO, F> {
    io: IO,
    total: usize,
    current: usize,
    notify: F,
}

impl<R, F> ProgressIO<R, F>
where
    R: Read,
    F: Fn(usize, usize),
{
    pub fn reader(total: usize, reader: R, notify: F) -> Self {
        notify(0, total);
        ProgressIO {
            io: reader,
            current: 0,
            total,
            notify,
        }
    }
}

impl<R, F> Read for ProgressIO<R, F>
where
    R: Read,
    F: Fn(usize, usize),
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let size = self.io.read(buf)?;
        self.current += size;
        (self.notify)(self.current, self.total);
        Ok(size)
    }
}

impl<F> ProgressIO<Cursor<Vec<u8>>, F>
where
    F: Fn(usize, usize),
{
    pub fn reader_from(data: Vec<u8>, notify: F) -> Self {
        Self::reader(data.len(), Cursor::new(data), notify)
    }
}
