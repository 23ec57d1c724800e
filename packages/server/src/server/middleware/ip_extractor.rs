use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::net::{IpAddr, SocketAddr};

/// Caller address, inserted into request extensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

/// Proxy headers first (`X-Forwarded-For`, then `X-Real-IP`), socket address last.
pub async fn extract_client_ip(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    mut request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(request.headers(), addr.ip());
    request.extensions_mut().insert(ClientIp(ip));
    next.run(request).await
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    let value = headers.get(name)?.to_str().ok()?;
    // X-Forwarded-For lists every hop; the client is the first one
    value.split(',').next()?.trim().parse().ok()
}

fn client_ip(headers: &HeaderMap, socket_ip: IpAddr) -> IpAddr {
    header_ip(headers, "x-forwarded-for")
        .or_else(|| header_ip(headers, "x-real-ip"))
        .unwrap_or(socket_ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn socket() -> IpAddr {
        "10.0.0.1".parse().unwrap()
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "41.243.1.7, 10.0.0.2".parse().unwrap());
        assert_eq!(
            client_ip(&headers, socket()),
            "41.243.1.7".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_real_ip_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "41.243.1.8".parse().unwrap());
        assert_eq!(
            client_ip(&headers, socket()),
            "41.243.1.8".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_falls_back_to_socket() {
        assert_eq!(client_ip(&HeaderMap::new(), socket()), socket());
    }

    #[test]
    fn test_garbage_forwarded_header_falls_through() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "not-an-ip".parse().unwrap());
        headers.insert("x-real-ip", "41.243.1.9".parse().unwrap());
        assert_eq!(
            client_ip(&headers, socket()),
            "41.243.1.9".parse::<IpAddr>().unwrap()
        );

        headers.remove("x-real-ip");
        assert_eq!(client_ip(&headers, socket()), socket());
    }
}
