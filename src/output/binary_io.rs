//! Little-endian primitive I/O used by the gene blob format.

use std::io::{Read, Write};

use crate::error::Error;
use crate::interval::Interval;

pub(super) trait BinaryWrite: Write {
    fn write_u8(&mut self, value: u8) -> Result<(), Error> {
        self.write_all(&[value])?;
        Ok(())
    }

    fn write_u16(&mut self, value: u16) -> Result<(), Error> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_u32(&mut self, value: u32) -> Result<(), Error> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_u64(&mut self, value: u64) -> Result<(), Error> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> Result<(), Error> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> Result<(), Error> {
        let len = u32::try_from(len)
            .map_err(|_| Error::Validation(format!("length {len} does not fit in u32")))?;
        self.write_u32(len)
    }

    /// u32 length prefix followed by UTF-8 bytes.
    fn write_string(&mut self, s: &str) -> Result<(), Error> {
        self.write_len(s.len())?;
        self.write_all(s.as_bytes())?;
        Ok(())
    }

    fn write_opt_string(&mut self, s: Option<&str>) -> Result<(), Error> {
        match s {
            Some(s) => {
                self.write_u8(1)?;
                self.write_string(s)
            }
            None => self.write_u8(0),
        }
    }

    fn write_interval(&mut self, interval: Interval) -> Result<(), Error> {
        self.write_i32(interval.start)?;
        self.write_i32(interval.stop)
    }

    fn write_opt_interval(&mut self, interval: Option<Interval>) -> Result<(), Error> {
        match interval {
            Some(interval) => {
                self.write_u8(1)?;
                self.write_interval(interval)
            }
            None => self.write_u8(0),
        }
    }
}

pub(super) trait BinaryRead: Read {
    fn read_u8(&mut self) -> Result<u8, Error> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16(&mut self) -> Result<u16, Error> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32(&mut self) -> Result<u32, Error> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&mut self) -> Result<u64, Error> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn read_i32(&mut self) -> Result<i32, Error> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    fn read_flag(&mut self) -> Result<bool, Error> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::Format(format!("invalid presence flag: {other}"))),
        }
    }

    fn read_string(&mut self) -> Result<String, Error> {
        let len = self.read_u32()? as usize;
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::Parse(format!("invalid UTF-8: {e}")))
    }

    fn read_opt_string(&mut self) -> Result<Option<String>, Error> {
        if self.read_flag()? {
            Ok(Some(self.read_string()?))
        } else {
            Ok(None)
        }
    }

    fn read_interval(&mut self) -> Result<Interval, Error> {
        let start = self.read_i32()?;
        let stop = self.read_i32()?;
        Ok(Interval::new(start, stop))
    }

    fn read_opt_interval(&mut self) -> Result<Option<Interval>, Error> {
        if self.read_flag()? {
            Ok(Some(self.read_interval()?))
        } else {
            Ok(None)
        }
    }
}

impl<W: Write + ?Sized> BinaryWrite for W {}
impl<R: Read + ?Sized> BinaryRead for R {}
