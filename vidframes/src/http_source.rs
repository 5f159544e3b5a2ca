/*!
    Byte source backed by HTTP range requests.
*/

use std::io;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::RANGE;
use tracing::{debug, trace};

/**
    Bytes requested per range request unless configured otherwise.
*/
pub const DEFAULT_CHUNK_SIZE: usize = 32768;

/**
    Reads a remote resource front to back, one `Range: bytes=start-end`
    request per read.

    Servers may answer with fewer bytes than requested; the next read asks
    for the rest. An empty or `416 Range Not Satisfiable` response marks the
    end of the resource. Servers that ignore ranges are reported as an error.
*/
pub struct HttpRangeSource {
    client: Client,
    url: String,
    offset: u64,
    chunk_size: usize,
    finished: bool,
}

impl HttpRangeSource {
    pub fn new(url: &str, chunk_size: usize) -> reqwest::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, url, chunk_size))
    }

    pub fn with_client(client: Client, url: &str, chunk_size: usize) -> Self {
        Self {
            client,
            url: url.to_string(),
            offset: 0,
            chunk_size: chunk_size.max(1),
            finished: false,
        }
    }
}

impl io::Read for HttpRangeSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.finished || buf.is_empty() {
            return Ok(0);
        }

        let len = buf.len().min(self.chunk_size);
        let range = range_header(self.offset, len);
        trace!(%range, "requesting range");

        let response = self
            .client
            .get(&self.url)
            .header(RANGE, &range)
            .send()
            .map_err(io::Error::other)?;

        match response.status() {
            StatusCode::PARTIAL_CONTENT => {}
            StatusCode::RANGE_NOT_SATISFIABLE => {
                debug!(offset = self.offset, "end of remote resource");
                self.finished = true;
                return Ok(0);
            }
            status => {
                return Err(io::Error::other(format!(
                    "range request {range} answered with {status}"
                )));
            }
        }

        let body = response.bytes().map_err(io::Error::other)?;
        let read = body.len().min(len);
        buf[..read].copy_from_slice(&body[..read]);
        self.offset += read as u64;

        if read == 0 {
            debug!(offset = self.offset, "end of remote resource");
            self.finished = true;
        }

        Ok(read)
    }
}

fn range_header(offset: u64, len: usize) -> String {
    format!("bytes={}-{}", offset, offset + len as u64 - 1)
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /**
        Serve `data` with range support, one request per connection, never
        answering with more than `max_body` bytes.
    */
    fn serve(data: Vec<u8>, max_body: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/clip.y4m", listener.local_addr().unwrap());

        thread::spawn(move || {
            for stream in listener.incoming() {
                let mut stream = stream.unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut range = None;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some(value) = line.to_ascii_lowercase().strip_prefix("range: bytes=") {
                        let (start, end) = value.split_once('-').unwrap();
                        range = Some((start.parse::<usize>().unwrap(), end.parse::<usize>().unwrap()));
                    }
                }

                let (start, end) = range.unwrap();
                if start >= data.len() {
                    write!(
                        stream,
                        "HTTP/1.1 416 Range Not Satisfiable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    )
                    .unwrap();
                    continue;
                }
                let end = end.min(data.len() - 1).min(start.saturating_add(max_body - 1));
                let body = &data[start..=end];
                write!(
                    stream,
                    "HTTP/1.1 206 Partial Content\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                )
                .unwrap();
                stream.write_all(body).unwrap();
            }
        });

        url
    }

    fn source(url: &str, chunk_size: usize) -> HttpRangeSource {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpRangeSource::with_client(client, url, chunk_size)
    }

    fn read_all(source: &mut HttpRangeSource) -> Vec<u8> {
        let mut received = Vec::new();
        let mut buf = [0u8; 400];
        loop {
            match source.read(&mut buf).unwrap() {
                0 => return received,
                n => received.extend_from_slice(&buf[..n]),
            }
        }
    }

    #[test]
    fn range_header_is_inclusive() {
        assert_eq!(range_header(0, 32768), "bytes=0-32767");
        assert_eq!(range_header(32768, 16), "bytes=32768-32783");
    }

    #[test]
    fn reads_resource_in_chunks() {
        let data: Vec<u8> = (0..=255).cycle().take(1000).collect();
        let url = serve(data.clone(), usize::MAX);

        let mut source = source(&url, 400);
        let received = read_all(&mut source);

        assert_eq!(received, data);
        assert_eq!(source.read(&mut [0u8; 16]).unwrap(), 0);
    }

    #[test]
    fn exact_multiple_ends_on_unsatisfiable_range() {
        let data = vec![7u8; 800];
        let url = serve(data.clone(), usize::MAX);

        let mut source = source(&url, 400);
        let received = read_all(&mut source);

        assert_eq!(received, data);
    }

    #[test]
    fn capped_responses_do_not_truncate() {
        let data: Vec<u8> = (0..=255).cycle().take(1000).collect();
        let url = serve(data.clone(), 150);

        let mut source = source(&url, 400);
        let received = read_all(&mut source);

        assert_eq!(received, data);
    }
}
