//! In memory backend for tests.
//!
//! [`MockServer`] answers the messages this crate sends the way a postgres
//! backend would: transaction blocks with rollback, large object functions,
//! descriptors closed at transaction end, and the aborted state after an
//! error inside a transaction.
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    io,
    task::{Context, Poll},
};

use crate::{
    Result,
    ext::{BufMutExt, BytesExt},
    postgres::{
        BackendProtocol, ErrorResponse, FrontendProtocol, NoticeResponse, Oid,
        backend::{CommandComplete, FunctionCallResponse, ReadyForQuery},
        frontend,
    },
    transport::PgTransport,
};

const INV_WRITE: i32 = 0x20000;
const INV_READ: i32 = 0x40000;

/// SQLSTATE and message.
type Failure = (&'static str, String);

struct Descriptor {
    oid: Oid,
    mode: i32,
    offset: usize,
}

pub(crate) struct MockServer {
    inbox: VecDeque<(u8, Bytes)>,
    skip: usize,
    objects: BTreeMap<Oid, Vec<u8>>,
    /// Objects at `BEGIN`, present while in a transaction block.
    snapshot: Option<BTreeMap<Oid, Vec<u8>>>,
    aborted: bool,
    descriptors: HashMap<i32, Descriptor>,
    next_fd: i32,
    next_oid: Oid,
    calls: usize,
    /// Count the next `lowrite` reports instead of the written length.
    lowrite_count: Option<i32>,
}

impl MockServer {
    pub fn new() -> Self {
        Self {
            inbox: VecDeque::new(),
            skip: 0,
            objects: BTreeMap::new(),
            snapshot: None,
            aborted: false,
            descriptors: HashMap::new(),
            next_fd: 0,
            next_oid: 16384,
            calls: 0,
            lowrite_count: None,
        }
    }

    /// Number of function call received.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Make the next `lowrite` answer `count`, as a misbehaving server would.
    pub fn lowrite_count(&mut self, count: i32) {
        self.lowrite_count = Some(count);
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Queue a notice before the next reply, it must never reach the caller.
    pub fn notice(&mut self) {
        let mut body = BytesMut::new();
        body.put_u8(b'M');
        body.put_nul_string("notice");
        body.put_u8(0);
        self.reply(NoticeResponse::MSGTYPE, body);
    }

    fn reply(&mut self, msgtype: u8, body: BytesMut) {
        self.inbox.push_back((msgtype, body.freeze()));
    }

    fn ready(&mut self) {
        let status = match (self.snapshot.is_some(), self.aborted) {
            (false, _) => b'I',
            (true, false) => b'T',
            (true, true) => b'E',
        };
        let mut body = BytesMut::new();
        body.put_u8(status);
        self.reply(ReadyForQuery::MSGTYPE, body);
    }

    fn error(&mut self, (code, message): Failure) {
        let mut body = BytesMut::new();
        for (field, value) in [(b'S', "ERROR"), (b'V', "ERROR"), (b'C', code), (b'M', message.as_str())] {
            body.put_u8(field);
            body.put_nul_string(value);
        }
        body.put_u8(0);
        self.reply(ErrorResponse::MSGTYPE, body);
    }

    fn end_transaction(&mut self, commit: bool) -> &'static str {
        let snapshot = self.snapshot.take();
        let tag = match snapshot {
            Some(_) if commit && !self.aborted => "COMMIT",
            Some(snapshot) => {
                self.objects = snapshot;
                "ROLLBACK"
            }
            None if commit => "COMMIT",
            None => "ROLLBACK",
        };
        self.aborted = false;
        self.close_descriptors();
        tag
    }

    fn close_descriptors(&mut self) {
        self.descriptors.clear();
        self.next_fd = 0;
    }

    fn query(&mut self, sql: &str) {
        let tag = match sql {
            "COMMIT" => self.end_transaction(true),
            "ROLLBACK" => self.end_transaction(false),
            _ if self.aborted => {
                self.error(aborted());
                return self.ready();
            }
            "BEGIN" => {
                if self.snapshot.is_none() {
                    self.snapshot = Some(self.objects.clone());
                }
                "BEGIN"
            }
            _ => {
                self.error(("42601", format!("syntax error at or near \"{sql}\"")));
                return self.ready();
            }
        };

        let mut body = BytesMut::new();
        body.put_nul_string(tag);
        self.reply(CommandComplete::MSGTYPE, body);
        self.ready();
    }

    fn function_call(&mut self, mut body: Bytes) {
        self.calls += 1;

        let function = body.get_u32();
        let formats = body.get_u16();
        body.advance(usize::from(formats) * 2);

        let args = (0..body.get_u16())
            .map(|_| {
                let len = body.get_i32();
                body.split_to(usize::try_from(len).expect("mock does not take null argument"))
            })
            .collect::<Vec<_>>();

        let result = match self.aborted {
            true => Err(aborted()),
            false => self.invoke(function, &args),
        };

        match result {
            Ok(value) => {
                let mut body = BytesMut::new();
                body.put_i32(i32::try_from(value.len()).unwrap());
                body.put_slice(&value);
                self.reply(FunctionCallResponse::MSGTYPE, body);
            }
            Err(failure) => {
                if self.snapshot.is_some() {
                    self.aborted = true;
                }
                self.error(failure);
            }
        }

        // implicit transaction
        if self.snapshot.is_none() {
            self.close_descriptors();
        }

        self.ready();
    }

    fn invoke(&mut self, function: Oid, args: &[Bytes]) -> Result<Vec<u8>, Failure> {
        let int4 = |i: usize| args[i].clone().get_i32();
        let int8 = |i: usize| args[i].clone().get_i64();
        let oid = |i: usize| args[i].clone().get_u32();

        match function {
            // lo_create
            715 => {
                let mut oid = oid(0);
                if oid == 0 {
                    while self.objects.contains_key(&self.next_oid) {
                        self.next_oid += 1;
                    }
                    oid = self.next_oid;
                } else if self.objects.contains_key(&oid) {
                    return Err(("42710", format!("large object {oid} already exists")));
                }
                self.objects.insert(oid, Vec::new());
                Ok(oid.to_be_bytes().to_vec())
            }
            // lo_open
            952 => {
                let (oid, mode) = (oid(0), int4(1));
                if mode & (INV_READ | INV_WRITE) == 0 {
                    return Err(("22023", format!("invalid flags for opening a large object: {mode}")));
                }
                object(&mut self.objects, oid)?;
                let fd = self.next_fd;
                self.next_fd += 1;
                self.descriptors.insert(fd, Descriptor { oid, mode, offset: 0 });
                Ok(fd.to_be_bytes().to_vec())
            }
            // lo_close
            953 => {
                let fd = int4(0);
                descriptor(&mut self.descriptors, fd)?;
                self.descriptors.remove(&fd);
                Ok(0i32.to_be_bytes().to_vec())
            }
            // loread
            954 => {
                let (fd, len) = (int4(0), int4(1));
                let desc = readable(&mut self.descriptors, fd)?;
                let Ok(len) = usize::try_from(len) else {
                    return Err(("22023", "requested length cannot be negative".into()));
                };
                let data = object(&mut self.objects, desc.oid)?;
                let start = desc.offset.min(data.len());
                let end = (start + len).min(data.len());
                desc.offset = end;
                Ok(data[start..end].to_vec())
            }
            // lowrite
            955 => {
                let fd = int4(0);
                let desc = writable(&mut self.descriptors, fd)?;
                let data = object(&mut self.objects, desc.oid)?;
                let end = desc.offset + args[1].len();
                if data.len() < end {
                    data.resize(end, 0);
                }
                data[desc.offset..end].copy_from_slice(&args[1]);
                desc.offset = end;
                let count = self.lowrite_count.take();
                let count = count.unwrap_or_else(|| i32::try_from(args[1].len()).unwrap());
                Ok(count.to_be_bytes().to_vec())
            }
            // lo_unlink
            964 => {
                let oid = oid(0);
                object(&mut self.objects, oid)?;
                self.objects.remove(&oid);
                Ok(1i32.to_be_bytes().to_vec())
            }
            // lo_lseek64
            3170 => {
                let (fd, offset, whence) = (int4(0), int8(1), int4(2));
                let desc = descriptor(&mut self.descriptors, fd)?;
                let len = object(&mut self.objects, desc.oid)?.len();
                let base = match whence {
                    0 => 0,
                    1 => desc.offset as i64,
                    2 => len as i64,
                    _ => return Err(("22023", format!("invalid whence setting: {whence}"))),
                };
                let Ok(offset) = usize::try_from(base + offset) else {
                    return Err(("22023", format!("invalid seek offset: {}", base + offset)));
                };
                desc.offset = offset;
                Ok((offset as i64).to_be_bytes().to_vec())
            }
            // lo_tell64
            3171 => {
                let desc = descriptor(&mut self.descriptors, int4(0))?;
                object(&mut self.objects, desc.oid)?;
                Ok((desc.offset as i64).to_be_bytes().to_vec())
            }
            // lo_truncate64
            3172 => {
                let (fd, len) = (int4(0), int8(1));
                let desc = writable(&mut self.descriptors, fd)?;
                let Ok(len) = usize::try_from(len) else {
                    return Err(("22023", "requested length cannot be negative".into()));
                };
                object(&mut self.objects, desc.oid)?.resize(len, 0);
                Ok(0i32.to_be_bytes().to_vec())
            }
            _ => Err(("42883", format!("function with OID {function} does not exist"))),
        }
    }
}

fn aborted() -> Failure {
    (
        "25P02",
        "current transaction is aborted, commands ignored until end of transaction block".into(),
    )
}

fn object(objects: &mut BTreeMap<Oid, Vec<u8>>, oid: Oid) -> Result<&mut Vec<u8>, Failure> {
    objects
        .get_mut(&oid)
        .ok_or_else(|| ("42704", format!("large object {oid} does not exist")))
}

fn descriptor(descriptors: &mut HashMap<i32, Descriptor>, fd: i32) -> Result<&mut Descriptor, Failure> {
    descriptors
        .get_mut(&fd)
        .ok_or_else(|| ("42704", format!("invalid large-object descriptor: {fd}")))
}

fn readable(descriptors: &mut HashMap<i32, Descriptor>, fd: i32) -> Result<&mut Descriptor, Failure> {
    let desc = descriptor(descriptors, fd)?;
    match desc.mode & INV_READ {
        0 => Err(("55000", format!("large object descriptor {fd} was not opened for reading"))),
        _ => Ok(desc),
    }
}

fn writable(descriptors: &mut HashMap<i32, Descriptor>, fd: i32) -> Result<&mut Descriptor, Failure> {
    let desc = descriptor(descriptors, fd)?;
    match desc.mode & INV_WRITE {
        0 => Err(("55000", format!("large object descriptor {fd} was not opened for writing"))),
        _ => Ok(desc),
    }
}

impl PgTransport for MockServer {
    fn poll_flush(&mut self, _: &mut Context) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_recv<B: BackendProtocol>(&mut self, _: &mut Context) -> Poll<Result<B>> {
        loop {
            let Some((msgtype, body)) = self.inbox.pop_front() else {
                let err = io::Error::new(io::ErrorKind::UnexpectedEof, "no backend message");
                return Poll::Ready(Err(err.into()));
            };

            if self.skip > 0 {
                if msgtype == ReadyForQuery::MSGTYPE {
                    self.skip -= 1;
                }
                continue;
            }

            let result = match msgtype {
                NoticeResponse::MSGTYPE => continue,
                ErrorResponse::MSGTYPE => match ErrorResponse::decode(msgtype, body) {
                    Ok(err) => Err(err.into()),
                    Err(err) => Err(err.into()),
                },
                _ => B::decode(msgtype, body).map_err(Into::into),
            };

            return Poll::Ready(result);
        }
    }

    fn ready_request(&mut self) {
        self.skip += 1;
    }

    fn send<F: FrontendProtocol>(&mut self, message: F) {
        let mut buf = BytesMut::new();
        frontend::write(message, &mut buf);

        let msgtype = buf.get_u8();
        let _len = buf.get_u32();
        let mut body = buf.freeze();

        match msgtype {
            b'Q' => {
                let sql = body.get_nul_bytestr().unwrap();
                self.query(&sql);
            }
            b'F' => self.function_call(body),
            _ => panic!("mock does not handle frontend message {:?}", msgtype as char),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{fastpath, postgres::frontend::FnArg};

    #[tokio::test]
    async fn notice_ignored() {
        let mut server = MockServer::new();
        server.notice();
        let oid = fastpath::call(&mut server, 715, &[FnArg::Oid(0)]).await.unwrap();
        assert_eq!(oid.as_deref(), Some(&16384u32.to_be_bytes()[..]));
    }

    #[tokio::test]
    async fn implicit_transaction_closes_descriptors() {
        let mut server = MockServer::new();
        fastpath::call(&mut server, 715, &[FnArg::Oid(7)]).await.unwrap();
        let fd = fastpath::call(&mut server, 952, &[FnArg::Oid(7), FnArg::Int4(INV_READ)]).await.unwrap();
        assert!(fd.is_some());

        let err = fastpath::call(&mut server, 953, &[FnArg::Int4(0)]).await.unwrap_err();
        assert_eq!(err.code(), Some("42704"));

        let err = fastpath::call(&mut server, 715, &[FnArg::Oid(7)]).await.unwrap_err();
        assert_eq!(err.code(), Some("42710"));
    }
}
