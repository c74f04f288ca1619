use fdmux::Muxer;

use std::os::unix::io::RawFd;
use std::thread;
use std::time::{Duration, Instant};

fn pipe() -> (RawFd, RawFd) {
    let mut fds = [0 as libc::c_int; 2];
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    assert_eq!(rc, 0, "pipe() should succeed");

    (fds[0], fds[1])
}

fn socketpair() -> (RawFd, RawFd) {
    let mut fds = [0 as libc::c_int; 2];
    let rc = unsafe { libc::socketpair(libc::AF_UNIX, libc::SOCK_STREAM, 0, fds.as_mut_ptr()) };
    assert_eq!(rc, 0, "socketpair() should succeed");

    (fds[0], fds[1])
}

fn write_byte(fd: RawFd) {
    let buf = [0u8; 1];
    let n = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, 1) };
    assert_eq!(n, 1, "write to peer should succeed");
}

fn close_fd(fd: RawFd) {
    unsafe {
        libc::close(fd);
    }
}

#[test]
fn test_register_readable_is_idempotent() {
    let (r, w) = pipe();
    let mut mux = Muxer::new().expect("multiplexer construction should succeed");

    mux.register_readable(r).unwrap();
    mux.register_readable(r).unwrap();

    write_byte(w);

    let ready = mux.poll(Duration::from_secs(1)).unwrap();
    assert_eq!(
        ready.readable,
        vec![r],
        "a twice-registered descriptor should be reported exactly once"
    );

    close_fd(r);
    close_fd(w);
}

#[test]
fn test_only_the_ready_descriptor_is_reported() {
    let (r1, w1) = pipe();
    let (r2, w2) = pipe();
    let mut mux = Muxer::new().unwrap();

    mux.register_readable(r1).unwrap();
    mux.register_readable(r2).unwrap();

    write_byte(w1);

    let ready = mux.poll(Duration::from_secs(1)).unwrap();
    assert_eq!(ready.readable, vec![r1]);
    assert!(
        !ready.readable.contains(&r2),
        "a descriptor with no pending data should never be reported readable"
    );

    for fd in [r1, w1, r2, w2] {
        close_fd(fd);
    }
}

#[test]
fn test_descriptor_with_both_interests_lands_in_both_lists() {
    let (a, b) = socketpair();
    let mut mux = Muxer::new().unwrap();

    mux.register_readable(a).unwrap();
    mux.register_writable(a).unwrap();

    // Readable because the peer wrote, writable because the send buffer is
    // empty.
    write_byte(b);

    let ready = mux.poll(Duration::from_secs(1)).unwrap();
    assert!(ready.readable.contains(&a), "descriptor should be readable");
    assert!(ready.writable.contains(&a), "descriptor should be writable");

    close_fd(a);
    close_fd(b);
}

#[test]
fn test_unregistered_descriptor_is_never_reported() {
    let (r, w) = pipe();
    let mut mux = Muxer::new().unwrap();

    mux.register_readable(r).unwrap();
    write_byte(w);

    mux.unregister(r).unwrap();

    let ready = mux.poll(Duration::ZERO).unwrap();
    assert!(
        ready.is_empty(),
        "an unregistered descriptor should not be reported even while ready"
    );

    close_fd(r);
    close_fd(w);
}

#[test]
fn test_zero_timeout_does_not_block() {
    let (r, w) = pipe();
    let mut mux = Muxer::new().unwrap();

    mux.register_readable(r).unwrap();

    let start = Instant::now();
    let ready = mux.poll(Duration::ZERO).unwrap();

    assert!(ready.is_empty());
    assert!(
        start.elapsed() < Duration::from_millis(50),
        "a zero timeout should return immediately"
    );

    close_fd(r);
    close_fd(w);
}

#[test]
fn test_elapsed_timeout_yields_empty_result() {
    let (r, w) = pipe();
    let mut mux = Muxer::new().unwrap();

    mux.register_readable(r).unwrap();

    let start = Instant::now();
    let ready = mux.poll(Duration::from_millis(50)).unwrap();

    assert!(ready.is_empty(), "nothing ready is not an error");
    assert!(
        start.elapsed() >= Duration::from_millis(40),
        "the wait should have lasted about the requested timeout"
    );

    close_fd(r);
    close_fd(w);
}

#[test]
fn test_supervision_scenario() {
    // Descriptor A: child stdout with pending output. Descriptor B: a pipe
    // the supervisor wants to write into.
    let (a, a_peer) = pipe();
    let (_b_peer, b) = pipe();
    let mut mux = Muxer::new().unwrap();

    mux.register_readable(a).unwrap();
    mux.register_writable(b).unwrap();

    write_byte(a_peer);

    let ready = mux.poll(Duration::from_secs(1)).unwrap();
    assert_eq!(ready.readable, vec![a]);
    assert_eq!(ready.writable, vec![b]);

    for fd in [a, a_peer, _b_peer, b] {
        close_fd(fd);
    }
}

extern "C" fn noop_signal_handler(_sig: libc::c_int) {}

#[test]
fn test_interrupted_wait_yields_empty_result() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        let handler: extern "C" fn(libc::c_int) = noop_signal_handler;
        sa.sa_sigaction = handler as libc::sighandler_t;
        libc::sigemptyset(&mut sa.sa_mask);
        // No SA_RESTART: the wait call must observe EINTR.
        sa.sa_flags = 0;

        let rc = libc::sigaction(libc::SIGUSR1, &sa, std::ptr::null_mut());
        assert_eq!(rc, 0, "sigaction should succeed");
    }

    let (r, w) = pipe();
    let mut mux = Muxer::new().unwrap();
    mux.register_readable(r).unwrap();

    let target = unsafe { libc::pthread_self() } as usize;
    let signaller = thread::spawn(move || {
        for _ in 0..10 {
            thread::sleep(Duration::from_millis(25));
            unsafe {
                libc::pthread_kill(target as libc::pthread_t, libc::SIGUSR1);
            }
        }
    });

    let ready = mux
        .poll(Duration::from_secs(2))
        .expect("an interrupted wait is not a fatal error");
    assert!(
        ready.is_empty(),
        "an interrupted wait should report nothing ready"
    );

    signaller.join().unwrap();

    // The multiplexer keeps working normally afterwards.
    write_byte(w);
    let ready = mux.poll(Duration::from_secs(1)).unwrap();
    assert_eq!(ready.readable, vec![r]);

    close_fd(r);
    close_fd(w);
}
